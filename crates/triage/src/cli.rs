use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "triage")]
#[command(version)]
#[command(about = "Log triage: extraction, fault labeling and guided incident sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file to the data directory
    Init,

    /// Ingest a log batch (JSON array, JSON object or line-delimited text)
    Ingest {
        /// Input file (stdin if omitted or "-")
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Fetch events in a time window
    Window {
        /// Free-text time reference ("between 09:10 and 09:25", "around 09:30")
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        text: Option<String>,

        /// Window start timestamp
        #[arg(long)]
        start: Option<String>,

        /// Window end timestamp
        #[arg(long)]
        end: Option<String>,

        /// Max events fetched (config default if omitted)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Attach an advisory brief of the window
        #[arg(long)]
        summarize: bool,
    },

    /// Events sharing a correlation id
    Correlation {
        id: String,

        #[arg(
            short,
            long,
            default_value_t = 200,
            value_parser = clap::value_parser!(u64).range(1..=200)
        )]
        limit: u64,
    },

    /// Earliest high-severity event, optionally within bounds
    Pof {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Attach an advisory brief and a label
        #[arg(long)]
        enrich: bool,
    },

    /// Relabel recent events
    Label {
        /// Number of recent events (config default if omitted)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=2000))]
        limit: Option<u64>,
    },

    /// Label histogram over stored events
    Stats,

    /// Guided triage sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Ask the advisor a free-form question about the current incident
    Ask {
        text: String,

        /// Include this session's answers as context
        #[arg(long)]
        session: Option<String>,
    },

    /// Check the advisor connection
    Ping,

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session and print its first question
    Start {
        /// Let the advisor plan the questions
        #[arg(long)]
        dynamic: bool,

        #[arg(long, default_value = "cli")]
        initiator: String,
    },
    /// Answer the current question
    Answer { id: String, text: String },
    /// Show the session and its questions and answers
    Show { id: String },
    /// Print the plain-text summary
    Summary { id: String },
}
