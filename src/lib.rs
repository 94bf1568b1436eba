pub mod config;
pub mod dates;
pub mod distribute;
pub mod document;
pub mod error;
pub mod files;
pub mod recipients;
pub mod sequencer;
pub mod validation;
pub mod workflow;

use config::AppConfig;
use std::process::ExitCode;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;
use workflow::DocumentWorkflow;

/// Timestamp format for log lines, e.g. `14 March 2024 | 09:15:02.123`
const LOG_TIME_FORMAT: &str = "%d %B %Y | %H:%M:%S%.3f";

pub fn run() -> ExitCode {
    // Initialize tracing with RUST_LOG env filter
    // Default: warn for most crates, info for our app
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,mdr_letters_lib=info")),
        )
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(false)
        .init();

    tracing::info!("Initializing MDR Letters Processing System");

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match DocumentWorkflow::new(config).execute() {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(outcome) => {
            tracing::error!("Workflow stopped: {:?}", outcome);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Application execution failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
