use super::App;
use triage_session::SessionEngine;

pub fn run(text: &str, session: Option<&str>) -> anyhow::Result<()> {
    let app = App::open()?;
    let engine = SessionEngine::from_config(app.store, app.advisor, &app.config);
    let reply = engine.ask(text, session)?;
    println!("{}", serde_json::json!({ "reply": reply }));
    Ok(())
}
