//! # utils_setup
//!
//! Runs one lifecycle phase of the utils component and exits with the
//! phase's error code.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Instrument};

use setup_runtime::{exit_status, run_phase, system_orchestrator, Cli, RuntimeConfig};
use setup_telemetry::{init_telemetry, phase_span};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = RuntimeConfig::from_env().with_overrides(&cli.global);
    init_telemetry(&config.telemetry).context("failed to initialize logging")?;

    let cluster = cli.phase.config_url().clone();
    let request = cli.phase.into_request();
    let phase = request.phase();

    let outcome = async {
        info!(config = %cluster, "Phase started");
        let orchestrator = system_orchestrator(&config)?;
        run_phase(&orchestrator, &config, &cluster, &request).await
    }
    .instrument(phase_span!(phase.as_str()))
    .await;

    match outcome {
        Ok(()) => {
            info!(%phase, "Phase completed");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(%phase, code = e.code(), error = %e, "Phase failed");
            Ok(ExitCode::from(exit_status(e.code())))
        }
    }
}
