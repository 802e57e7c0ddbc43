use super::App;
use triage_core::QuestionMode;
use triage_session::SessionEngine;

fn engine() -> anyhow::Result<SessionEngine> {
    let app = App::open()?;
    Ok(SessionEngine::from_config(app.store, app.advisor, &app.config))
}

pub fn run_start(dynamic: bool, initiator: &str) -> anyhow::Result<()> {
    let mode = if dynamic {
        QuestionMode::Dynamic
    } else {
        QuestionMode::Scripted
    };
    let turn = engine()?.start(mode, initiator)?;
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}

pub fn run_answer(id: &str, text: &str) -> anyhow::Result<()> {
    let turn = engine()?.submit_answer(id, text)?;
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}

pub fn run_show(id: &str) -> anyhow::Result<()> {
    let transcript = engine()?.transcript(id)?;
    println!("{}", serde_json::to_string_pretty(&transcript)?);
    Ok(())
}

pub fn run_summary(id: &str) -> anyhow::Result<()> {
    let text = engine()?.summary(id)?;
    println!("{text}");
    Ok(())
}
