use super::App;

pub fn run() -> anyhow::Result<()> {
    let app = App::open()?;
    let output = triage_advisor::ping(app.advisor.as_ref());
    println!("{output}");
    Ok(())
}
