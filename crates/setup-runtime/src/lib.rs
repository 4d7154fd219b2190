//! # Setup Runtime
//!
//! Entry point plumbing for the `utils_setup` binary.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line (`cli`)
//! 2. Load `RuntimeConfig` from the environment, apply CLI overrides
//! 3. Install logging (`setup-telemetry`)
//! 4. Wire system adapters into a `SetupOrchestrator`
//! 5. Build the `ConfigContext` from the phase's `--config` URL
//! 6. Run the phase, map the outcome to an exit status

pub mod cli;
pub mod config;

use std::sync::Arc;

use shared_bus::MessageBusAdmin;
use shared_conf::{ConfUrl, JsonConfStore};
use tracing::debug;
use utils_setup::{
    ConfigContext, KafkaCliAdmin, PhaseRequest, ProcessRunner, SetupApi, SetupConfig, SetupError,
    SetupOrchestrator, SystemPackageValidator, SystemdServiceController, TokioProcessRunner,
};

pub use cli::{Cli, GlobalArgs, PhaseCommand};
pub use config::RuntimeConfig;

/// Orchestrator backed by the host system: tokio processes, pip/rpm,
/// systemctl and the Kafka admin scripts.
pub fn system_orchestrator(config: &RuntimeConfig) -> Result<SetupOrchestrator, SetupError> {
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
    let message_bus: Arc<dyn MessageBusAdmin> =
        Arc::new(KafkaCliAdmin::new(runner.clone(), &config.kafka_bin_dir));
    debug!(kafka_bin_dir = %config.kafka_bin_dir.display(), "Wiring system adapters");

    SetupOrchestrator::new(
        SetupConfig::default(),
        Arc::new(SystemPackageValidator::new(runner.clone())),
        runner.clone(),
        message_bus,
        Arc::new(SystemdServiceController::new(runner)),
    )
}

/// Context for one invocation, rooted at the phase's cluster config.
pub fn build_context(config: &RuntimeConfig, cluster: &ConfUrl) -> Result<ConfigContext, SetupError> {
    ConfigContext::new(
        Box::new(JsonConfStore::new()),
        config.resolve_machine_id()?,
        cluster.clone(),
        config.cortx_conf.clone(),
    )
}

/// Build the context and run one phase.
pub async fn run_phase(
    api: &dyn SetupApi,
    config: &RuntimeConfig,
    cluster: &ConfUrl,
    request: &PhaseRequest,
) -> Result<(), SetupError> {
    let mut ctx = build_context(config, cluster)?;
    api.run(&mut ctx, request).await
}

/// Process exit status for a failed phase: the error code when it fits
/// in 1..=255, otherwise 1.
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(22), 22);
        assert_eq!(exit_status(255), 255);
        assert_eq!(exit_status(0x1101), 1);
        assert_eq!(exit_status(0), 1);
        assert_eq!(exit_status(-5), 1);
    }
}
