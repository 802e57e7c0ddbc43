//! Triage sessions: evidence lookup, question flow and summaries

mod context;
mod engine;
mod error;
pub mod evidence;
pub mod planner;
pub mod script;
pub mod summary;

pub use context::TurnContext;
pub use engine::{Clock, SessionEngine, Transcript, Turn, DYNAMIC_CLOSING, SCRIPTED_CLOSING};
pub use error::TriageError;
pub use evidence::{find_pof, find_pof_and_enrich, summarize_window, PofReport, WindowSummary};
