pub fn run() -> anyhow::Result<()> {
    println!("triage {}", env!("CARGO_PKG_VERSION"));
    println!("Log extraction, fault labeling and guided incident triage");
    Ok(())
}
