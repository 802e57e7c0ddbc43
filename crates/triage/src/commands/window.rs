use super::{bounds, App};
use triage_core::parse_window;

pub fn run(
    text: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    limit: Option<usize>,
    summarize: bool,
) -> anyhow::Result<()> {
    let interval = match text {
        Some(text) => parse_window(text),
        None => bounds(start, end)?,
    };
    let app = App::open()?;
    let limit = limit.unwrap_or(app.config.session.window_fetch_limit);

    let output = if summarize {
        let summary = triage_session::summarize_window(
            app.store.as_ref(),
            app.advisor.as_ref(),
            &interval,
            limit,
        )?;
        serde_json::to_value(&summary)?
    } else {
        let events = app.store.fetch_window(&interval, limit)?;
        serde_json::json!({
            "interval": interval,
            "events": events,
        })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
