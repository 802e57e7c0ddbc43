use super::App;
use triage_classify::{histogram, Classifier, LabelMemo};

pub fn run(limit: Option<u64>) -> anyhow::Result<()> {
    let app = App::open()?;
    let limit = limit
        .map(|l| l as usize)
        .unwrap_or(app.config.labeler.relabel_limit);

    let memo = LabelMemo::new(app.config.labeler.max_advisory_calls);
    let classifier = Classifier::from_settings(&app.config.labeler);
    let labeled = classifier.label_recent(app.store.as_ref(), &memo, app.advisor.as_ref(), limit)?;

    let items: Vec<serde_json::Value> = labeled
        .iter()
        .map(|(id, label)| serde_json::json!({ "id": id, "label": label }))
        .collect();
    let output = serde_json::json!({
        "labeled": items.len(),
        "advisory_calls": memo.calls_used(),
        "items": items,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn run_stats() -> anyhow::Result<()> {
    let app = App::open()?;
    let counts = histogram(app.store.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}
