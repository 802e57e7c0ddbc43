//! Persistence for log events, labels and triage sessions

mod sqlite;
mod store;

pub use sqlite::SqliteStore;
pub use store::Store;
