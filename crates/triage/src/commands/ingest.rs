use super::App;
use std::io::Read;
use std::path::Path;
use triage_core::{normalize_payload, Payload};

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn run(file: Option<&Path>) -> anyhow::Result<()> {
    let input = read_input(file)?;
    let events = normalize_payload(&Payload::from_text(&input));

    let app = App::open()?;
    let inserted = app.store.insert_events(&events)?;
    tracing::info!(inserted, "ingested log batch");

    println!("{}", serde_json::json!({ "ingested": inserted }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("batch.jsonl");
        std::fs::write(&path, "{\"message\": \"hi\"}\n").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "{\"message\": \"hi\"}\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        assert!(read_input(Some(Path::new("/nonexistent/batch.json"))).is_err());
    }
}
