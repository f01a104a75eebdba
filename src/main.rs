//! Loan Approval - Main Entry Point
//!
//! Trainer, prediction form and one-shot scoring behind a single binary.

use clap::Parser;
use loan_approval::cli::{cmd_info, cmd_interactive, cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use loan_approval::config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_approval=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(command) => {
            let config = command.config();
            match &command {
                Commands::Train { .. } => cmd_train(&config)?,
                Commands::Serve { .. } => cmd_serve(&config)?,
                Commands::Predict { values, .. } => cmd_predict(&config, values)?,
                Commands::Info { data } => cmd_info(data)?,
            }
        }
        None => {
            // Default: interactive launcher
            cmd_interactive(&AppConfig::default())?;
        }
    }

    Ok(())
}
