//! Tally CLI
//!
//! Command-line interface for the Tally order and inventory engine.

use clap::Parser;
use tally_cli::{AppConfig, Cli, CliError};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays parseable JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match AppConfig::load() {
        Ok(config) => tally_cli::run(cli, config).await,
        Err(e) => Err(CliError::from(e)),
    };

    match result.and_then(|output| {
        serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::new(tally_cli::ErrorCode::Internal, e.to_string()))
    }) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
