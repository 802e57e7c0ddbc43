mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, SessionAction};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Ingest { file } => commands::ingest::run(file.as_deref()),
        Commands::Window {
            text,
            start,
            end,
            limit,
            summarize,
        } => commands::window::run(
            text.as_deref(),
            start.as_deref(),
            end.as_deref(),
            limit,
            summarize,
        ),
        Commands::Correlation { id, limit } => commands::correlation::run(&id, limit),
        Commands::Pof { start, end, enrich } => {
            commands::pof::run(start.as_deref(), end.as_deref(), enrich)
        }
        Commands::Label { limit } => commands::label::run(limit),
        Commands::Stats => commands::label::run_stats(),
        Commands::Session { action } => match action {
            SessionAction::Start { dynamic, initiator } => {
                commands::session::run_start(dynamic, &initiator)
            }
            SessionAction::Answer { id, text } => commands::session::run_answer(&id, &text),
            SessionAction::Show { id } => commands::session::run_show(&id),
            SessionAction::Summary { id } => commands::session::run_summary(&id),
        },
        Commands::Ask { text, session } => commands::ask::run(&text, session.as_deref()),
        Commands::Ping => commands::ping::run(),
        Commands::Version => commands::version::run(),
    }
}
