pub mod ask;
pub mod correlation;
pub mod ingest;
pub mod init;
pub mod label;
pub mod ping;
pub mod pof;
pub mod session;
pub mod version;
pub mod window;

use std::sync::Arc;
use triage_advisor::Advisor;
use triage_core::{timestamp, Config, Interval, Paths};
use triage_store::{SqliteStore, Store};

/// Everything a command needs: resolved config, opened store, advisor
pub struct App {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub advisor: Arc<dyn Advisor>,
}

impl App {
    pub fn open() -> anyhow::Result<Self> {
        let paths = Paths::new()?;
        let config = Config::load(&paths);
        let db_path = config.db_path(&paths);
        tracing::debug!(db = %db_path.display(), "opening store");
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path)?);
        let advisor = triage_advisor::connect(&config.advisor);
        Ok(Self {
            config,
            store,
            advisor,
        })
    }
}

/// Explicit `--start/--end` bounds; unparsable values are an error here
pub fn bounds(start: Option<&str>, end: Option<&str>) -> anyhow::Result<Interval> {
    let parse = |raw: Option<&str>, name: &str| -> anyhow::Result<_> {
        raw.map(|s| {
            timestamp::parse_lenient(s)
                .ok_or_else(|| anyhow::anyhow!("unrecognized {name} timestamp: {s}"))
        })
        .transpose()
    };
    Ok(Interval::new(parse(start, "start")?, parse(end, "end")?))
}
