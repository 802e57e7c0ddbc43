use super::App;

pub fn run(id: &str, limit: u64) -> anyhow::Result<()> {
    let app = App::open()?;
    let events = app.store.search_by_correlation(id, limit as usize)?;
    let output = serde_json::json!({
        "correlation_id": id,
        "count": events.len(),
        "events": events,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
