mod cli;
mod commands;
mod config;
mod error;
mod output;
mod setup;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use sprintflow_storage::paths;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error::handle_error(err);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::CliConfig::load();
    config.apply_api_key_env();

    // Always log to a daily file; --verbose mirrors it to stderr
    let log_dir = paths::ensure_data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "sprintflow.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("SPRINTFLOW_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_level(true);
    if cli.verbose {
        builder
            .with_writer(non_blocking.and(std::io::stderr))
            .init();
    } else {
        builder.with_writer(non_blocking).init();
    }

    let (service, store) = setup::prepare_service(cli.db_path, &config)?;

    match cli.command {
        Commands::Agents => commands::agents::run(&service, cli.format),
        Commands::Ask(args) => commands::ask::run(&service, &config, args, cli.format).await,
        Commands::Chat(args) => commands::chat::run(&service, &config, args, cli.format).await,
        Commands::Session { command } => {
            commands::session::run(&service, store.as_ref(), command, cli.format).await
        }
    }
}
