//! Path resolution for the triage data directory

use std::path::{Path, PathBuf};

/// Resolves standard paths for triage files
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// `$TRIAGE_HOME` if set, else `~/.triage`
    pub fn new() -> std::io::Result<Self> {
        if let Some(home) = std::env::var_os("TRIAGE_HOME").filter(|v| !v.is_empty()) {
            return Ok(Self {
                home: PathBuf::from(home),
            });
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self {
            home: home.join(".triage"),
        })
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.json")
    }

    /// Get the default database path (`$TRIAGE_DB` overrides)
    pub fn db_file(&self) -> PathBuf {
        match std::env::var_os("TRIAGE_DB").filter(|v| !v.is_empty()) {
            Some(db) => PathBuf::from(db),
            None => self.home.join("triage.db"),
        }
    }
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_paths_from_env() {
        std::env::set_var("TRIAGE_HOME", "/tmp/triage-home-test");
        std::env::remove_var("TRIAGE_DB");
        let paths = Paths::new().unwrap();
        assert_eq!(paths.home, PathBuf::from("/tmp/triage-home-test"));
        assert!(paths.db_file().ends_with("triage.db"));
        assert!(paths.config_file().ends_with("config.json"));
        std::env::remove_var("TRIAGE_HOME");
    }

    #[test]
    #[serial]
    fn test_db_override() {
        std::env::set_var("TRIAGE_DB", "/tmp/elsewhere.db");
        let paths = Paths::with_home("/tmp/unused");
        assert_eq!(paths.db_file(), PathBuf::from("/tmp/elsewhere.db"));
        std::env::remove_var("TRIAGE_DB");
    }

    #[test]
    fn test_atomic_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("nested").join("config.json");

        atomic_write(&target, b"{}").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
        assert!(!target.with_extension("tmp").exists());
    }
}
