//! End-to-end runs of parsed command lines against scratch config files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use shared_bus::InMemoryMessageBus;
use setup_runtime::{exit_status, run_phase, system_orchestrator, Cli, RuntimeConfig};
use utils_setup::{
    codes, ProcessRunner, SetupConfig, SetupOrchestrator, SystemPackageValidator,
    SystemdServiceController, TokioProcessRunner,
};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn parse(dir: &Path, args: &[&str]) -> (Cli, RuntimeConfig) {
    let cluster = format!("json://{}", dir.join("cluster.conf").display());
    let component = format!("json://{}", dir.join("cortx.conf").display());
    let mut argv = vec!["utils_setup"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&["--config", cluster.as_str(), "--cortx-conf", component.as_str()]);
    let cli = Cli::parse_from(argv);
    let config = RuntimeConfig::default().with_overrides(&cli.global);
    (cli, config)
}

#[tokio::test]
async fn test_upgrade_hooks_succeed() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("cluster.conf"), "{}");

    for args in [
        &["pre_upgrade", "--level", "node", "--machine-id", "m1"][..],
        &["post_upgrade", "--level", "cluster", "--machine-id", "m1"][..],
        &["upgrade", "--machine-id", "m1"][..],
        &["validate", "--phase", "init", "--machine-id", "m1"][..],
    ] {
        let (cli, config) = parse(dir.path(), args);
        let orchestrator = system_orchestrator(&config).unwrap();
        let cluster = cli.phase.config_url().clone();
        let request = cli.phase.into_request();
        run_phase(&orchestrator, &config, &cluster, &request)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_missing_machine_id_file_maps_to_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("cluster.conf"), "{}");
    let (cli, mut config) = parse(dir.path(), &["upgrade"]);
    config.machine_id_file = dir.path().join("machine-id");

    let orchestrator = system_orchestrator(&config).unwrap();
    let cluster = cli.phase.config_url().clone();
    let err = run_phase(&orchestrator, &config, &cluster, &cli.phase.into_request())
        .await
        .unwrap_err();
    assert_eq!(err.code(), codes::ENOENT);
    assert_eq!(exit_status(err.code()), 2);
}

#[tokio::test]
async fn test_init_through_cli_registers_message_types() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("cluster.conf"),
        r#"{
            "cortx": {
                "utils": { "message_bus_backend": "kafka" },
                "external": { "kafka": { "endpoints": "tcp://kafka-1:9092" } }
            }
        }"#,
    );
    let (cli, config) = parse(dir.path(), &["init", "--machine-id", "m1"]);

    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
    let bus = Arc::new(InMemoryMessageBus::new());
    let orchestrator = SetupOrchestrator::new(
        SetupConfig::default(),
        Arc::new(SystemPackageValidator::new(runner.clone())),
        runner.clone(),
        bus.clone(),
        Arc::new(SystemdServiceController::new(runner)),
    )
    .unwrap();

    let cluster = cli.phase.config_url().clone();
    let request = cli.phase.into_request();
    run_phase(&orchestrator, &config, &cluster, &request)
        .await
        .unwrap();
    assert_eq!(bus.partitions("IEM"), Some(1));
    assert_eq!(bus.partitions("audit_messages"), Some(1));
}

#[tokio::test]
async fn test_init_without_backend_is_einval() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("cluster.conf"), "{}");
    let (cli, config) = parse(dir.path(), &["init", "--machine-id", "m1"]);

    let orchestrator = system_orchestrator(&config).unwrap();
    let cluster = cli.phase.config_url().clone();
    let err = run_phase(&orchestrator, &config, &cluster, &cli.phase.into_request())
        .await
        .unwrap_err();
    assert_eq!(err.code(), codes::EINVAL);
    assert_eq!(exit_status(err.code()), 22);
}
