//! hrsync CLI - Main entry point

use clap::Parser;
use hrsync_cli::{Cli, ClientConfig, Commands, ConfigCommand};
use hrsync_common::logging::{init_logging, ConsoleStream, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads HRSYNC_* variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the report
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .console_stream(ConsoleStream::Stderr)
        .log_file_prefix("hrsync-cli")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> hrsync_cli::Result<()> {
    let config = ClientConfig::resolve(cli.config.as_deref(), &cli.overrides)?;

    match &cli.command {
        Commands::Upload { file } => hrsync_cli::commands::upload::run(file, &config).await,
        Commands::Validate { file } => hrsync_cli::commands::validate::run(file).await,
        Commands::Config { command } => match command {
            ConfigCommand::Show => hrsync_cli::commands::config::show(&config).await,
        },
    }
}
