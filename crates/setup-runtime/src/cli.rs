//! Command line of `utils_setup`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared_conf::ConfUrl;
use utils_setup::{Phase, PhaseRequest, UpgradeLevel, DEFAULT_TEST_PLAN};

/// Setup phases of the utils component
#[derive(Parser, Debug)]
#[command(name = "utils_setup", version)]
#[command(about = "Run a lifecycle phase of the utils component")]
pub struct Cli {
    #[command(subcommand)]
    pub phase: PhaseCommand,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every phase.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Machine id of this node (default: read from the machine id file)
    #[arg(long, global = true)]
    pub machine_id: Option<String>,

    /// Component conf URL (default: <local storage>/utils/conf/cortx.conf)
    #[arg(long, global = true)]
    pub cortx_conf: Option<ConfUrl>,

    /// Directory holding the Kafka admin scripts
    #[arg(long, global = true)]
    pub kafka_bin_dir: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Cluster config template URL, e.g. json:///etc/cortx/cluster.conf
    #[arg(long)]
    pub config: ConfUrl,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PhaseCommand {
    /// Check prerequisites of a phase
    #[command(name = "validate")]
    Validate {
        #[command(flatten)]
        config: ConfigArg,
        /// Phase to validate
        #[arg(long)]
        phase: Option<Phase>,
    },

    /// Validate packages and seed the component conf
    #[command(name = "post_install")]
    PostInstall(ConfigArg),

    /// Propagate storage paths and prepare log files
    #[command(name = "config")]
    Config(ConfigArg),

    /// Register message types
    #[command(name = "init")]
    Init(ConfigArg),

    /// Run a test plan
    #[command(name = "test")]
    Test {
        #[command(flatten)]
        config: ConfigArg,
        /// Test plan name
        #[arg(long, default_value = DEFAULT_TEST_PLAN)]
        plan: String,
    },

    /// Purge messages and truncate logs
    #[command(name = "reset")]
    Reset(ConfigArg),

    /// Deregister message types
    #[command(name = "cleanup")]
    Cleanup {
        #[command(flatten)]
        config: ConfigArg,
        /// Also delete log files
        #[arg(long)]
        pre_factory: bool,
    },

    #[command(name = "upgrade")]
    Upgrade(ConfigArg),

    #[command(name = "pre_upgrade")]
    PreUpgrade {
        #[command(flatten)]
        config: ConfigArg,
        #[arg(long)]
        level: UpgradeLevel,
    },

    #[command(name = "post_upgrade")]
    PostUpgrade {
        #[command(flatten)]
        config: ConfigArg,
        #[arg(long)]
        level: UpgradeLevel,
    },
}

impl PhaseCommand {
    /// Cluster config URL the context is built from.
    pub fn config_url(&self) -> &ConfUrl {
        match self {
            Self::PostInstall(arg)
            | Self::Config(arg)
            | Self::Init(arg)
            | Self::Reset(arg)
            | Self::Upgrade(arg)
            | Self::Validate { config: arg, .. }
            | Self::Test { config: arg, .. }
            | Self::Cleanup { config: arg, .. }
            | Self::PreUpgrade { config: arg, .. }
            | Self::PostUpgrade { config: arg, .. } => &arg.config,
        }
    }

    pub fn into_request(self) -> PhaseRequest {
        match self {
            Self::Validate { phase, .. } => PhaseRequest::Validate { phase },
            Self::PostInstall(arg) => PhaseRequest::PostInstall { config: arg.config },
            Self::Config(arg) => PhaseRequest::Config { config: arg.config },
            Self::Init(arg) => PhaseRequest::Init { config: arg.config },
            Self::Test { config, plan } => PhaseRequest::Test {
                config: config.config,
                plan,
            },
            Self::Reset(arg) => PhaseRequest::Reset { config: arg.config },
            Self::Cleanup {
                config,
                pre_factory,
            } => PhaseRequest::Cleanup {
                config: config.config,
                pre_factory,
            },
            Self::Upgrade(arg) => PhaseRequest::Upgrade { config: arg.config },
            Self::PreUpgrade { level, .. } => PhaseRequest::PreUpgrade { level },
            Self::PostUpgrade { level, .. } => PhaseRequest::PostUpgrade { level },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_test_phase() {
        let cli = Cli::parse_from([
            "utils_setup",
            "test",
            "--config",
            "json:///etc/cortx/cluster.conf",
            "--machine-id",
            "m1",
        ]);
        assert_eq!(cli.global.machine_id.as_deref(), Some("m1"));
        assert_eq!(
            cli.phase.into_request(),
            PhaseRequest::Test {
                config: ConfUrl::json("/etc/cortx/cluster.conf"),
                plan: "sanity".into(),
            }
        );
    }

    #[test]
    fn test_parse_cleanup_and_upgrade() {
        let cli = Cli::parse_from([
            "utils_setup",
            "cleanup",
            "--config",
            "json:///tmp/c.conf",
            "--pre-factory",
        ]);
        assert!(matches!(
            cli.phase.into_request(),
            PhaseRequest::Cleanup { pre_factory: true, .. }
        ));

        let cli = Cli::parse_from([
            "utils_setup",
            "pre_upgrade",
            "--config",
            "json:///tmp/c.conf",
            "--level",
            "cluster",
        ]);
        assert_eq!(cli.phase.config_url(), &ConfUrl::json("/tmp/c.conf"));
        assert_eq!(
            cli.phase.into_request(),
            PhaseRequest::PreUpgrade {
                level: UpgradeLevel::Cluster
            }
        );
    }

    #[test]
    fn test_rejects_unknown_scheme_and_level() {
        assert!(Cli::try_parse_from(["utils_setup", "init", "--config", "yaml:///tmp/c.yaml"]).is_err());
        assert!(Cli::try_parse_from([
            "utils_setup",
            "post_upgrade",
            "--config",
            "json:///tmp/c.conf",
            "--level",
            "rack"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["utils_setup", "init"]).is_err());
    }
}
