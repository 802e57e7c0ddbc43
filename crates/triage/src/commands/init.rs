use triage_core::{Config, Paths};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    if Config::write_default(&paths)? {
        println!("✓ Wrote default config to {}", paths.config_file().display());
    } else {
        println!("Config already exists at {}", paths.config_file().display());
    }
    println!("Database: {}", Config::load(&paths).db_path(&paths).display());
    Ok(())
}
