pub mod cli;
pub mod config;
pub mod db;
pub mod delimited;
pub mod error;
pub mod export;
pub mod extraction;
pub mod import;
pub mod keywords;
pub mod models;
pub mod search;
pub mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use error::AppError;
pub use store::RecordStore;

/// Entry point for the binary. Returns the process exit code.
pub fn run() -> i32 {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match run_cli(&cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            1
        }
    }
}

fn run_cli(cli: &cli::Cli) -> Result<(), AppError> {
    let config = cli::resolve_config(cli)?;
    tracing::info!(
        "{} v{} (database: {})",
        config::APP_NAME,
        config::APP_VERSION,
        config.database_path.display()
    );

    // One connection for the whole process; closed when `store` drops.
    let store = RecordStore::open(&config.database_path)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::execute(&cli.command, &store, &config, &mut out)
}
