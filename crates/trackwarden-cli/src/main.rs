//! Trackwarden CLI - Command-line front end for the trackback pipeline.

use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use trackwarden_cli::commands;
use trackwarden_cli::{config, Cli, Command, Formatter, OutputFormat};
use trackwarden_service::TrackbackService;
use trackwarden_store::SqliteStore;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> trackwarden_cli::Result<()> {
    let cli = Cli::parse();

    let service_config = config::load(cli.config.as_deref())?;

    let format: OutputFormat = cli.format.map(Into::into).unwrap_or_default();
    let color_enabled = !cli.no_color && std::io::stdout().is_terminal();
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::ShowConfig => {
            print!("{}", config::render(&service_config)?);
        }
        Command::Classify(args) => {
            let service = TrackbackService::from_config(service_config)?;
            commands::execute_classify(args, service.classifier(), &formatter).await?;
        }
        Command::Submit(args) => {
            let service = TrackbackService::from_config(service_config)?;
            let mut store = SqliteStore::new(&cli.db)?;
            commands::execute_submit(args, &service, &mut store, &formatter).await?;
            tracing::debug!("{}", service.metrics().summary());
        }
        Command::List(args) => {
            let store = SqliteStore::new(&cli.db)?;
            commands::execute_list(args, &store, &formatter)?;
        }
        Command::RegisterArticle(args) => {
            let mut store = SqliteStore::new(&cli.db)?;
            commands::execute_register_article(args, &mut store, &formatter)?;
        }
    }

    Ok(())
}
