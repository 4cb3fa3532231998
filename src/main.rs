use std::process::ExitCode;

use chrono::Utc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use routeboard::{BoardConfig, board};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Configuration problems abort before any network call and fail the
    // invocation loudly so the scheduler surfaces them.
    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Configuration error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Upstream and webhook failures degrade output quality, never
    // availability; the next scheduled tick is the retry.
    if let Err(err) = board::run_tick(&config, Utc::now()).await {
        error!("Tick finished without delivery: {err:#}");
    }

    ExitCode::SUCCESS
}
