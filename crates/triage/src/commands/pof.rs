use super::{bounds, App};
use triage_classify::{Classifier, LabelMemo};

pub fn run(start: Option<&str>, end: Option<&str>, enrich: bool) -> anyhow::Result<()> {
    let interval = bounds(start, end)?;
    let app = App::open()?;

    let output = if enrich {
        let memo = LabelMemo::new(app.config.labeler.max_advisory_calls);
        let classifier = Classifier::from_settings(&app.config.labeler);
        let report = triage_session::find_pof_and_enrich(
            app.store.as_ref(),
            app.advisor.as_ref(),
            &classifier,
            &memo,
            &interval,
        )?;
        serde_json::to_value(report)?
    } else {
        serde_json::to_value(triage_session::find_pof(app.store.as_ref(), &interval)?)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
