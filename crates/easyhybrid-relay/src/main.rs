//! easyhybrid OAuth relay entry point.

use std::process::ExitCode;

use easyhybrid_core::{TracingConfig, init_tracing};
use easyhybrid_relay::{RelayConfig, RelayResult};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing(TracingConfig::relay()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "relay stopped");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RelayResult<()> {
    let config = RelayConfig::from_env()?;
    easyhybrid_relay::serve(config).await
}
