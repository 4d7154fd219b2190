//! Runtime configuration: environment defaults overridden by CLI flags.

use std::env;
use std::fs;
use std::path::PathBuf;

use setup_telemetry::TelemetryConfig;
use shared_conf::ConfUrl;
use tracing::warn;
use utils_setup::{codes, SetupError, DEFAULT_KAFKA_BIN_DIR};

use crate::cli::GlobalArgs;

/// File holding this node's machine id.
pub const DEFAULT_MACHINE_ID_FILE: &str = "/etc/machine-id";

/// Everything the binary needs besides the phase request itself.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Explicit machine id; wins over `machine_id_file`
    pub machine_id: Option<String>,
    pub machine_id_file: PathBuf,
    /// Component conf URL; `None` derives it from the cluster config
    pub cortx_conf: Option<ConfUrl>,
    /// Directory holding the Kafka admin scripts
    pub kafka_bin_dir: PathBuf,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            machine_id: None,
            machine_id_file: PathBuf::from(DEFAULT_MACHINE_ID_FILE),
            cortx_conf: None,
            kafka_bin_dir: PathBuf::from(DEFAULT_KAFKA_BIN_DIR),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `UTILS_SETUP_MACHINE_ID_FILE`: machine id file (default: /etc/machine-id)
    /// - `UTILS_SETUP_CORTX_CONF`: component conf URL
    /// - `UTILS_SETUP_KAFKA_BIN_DIR`: Kafka scripts directory (default: /opt/kafka/bin)
    /// - logging variables, see `TelemetryConfig::from_env`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(path) = lookup("UTILS_SETUP_MACHINE_ID_FILE") {
            config.machine_id_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("UTILS_SETUP_CORTX_CONF") {
            match ConfUrl::parse(&raw) {
                Ok(url) => config.cortx_conf = Some(url),
                Err(e) => warn!(error = %e, "Ignoring UTILS_SETUP_CORTX_CONF"),
            }
        }
        if let Some(dir) = lookup("UTILS_SETUP_KAFKA_BIN_DIR") {
            config.kafka_bin_dir = PathBuf::from(dir);
        }
        config
    }

    /// Apply command line flags on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(id) = &args.machine_id {
            self.machine_id = Some(id.clone());
        }
        if let Some(url) = &args.cortx_conf {
            self.cortx_conf = Some(url.clone());
        }
        if let Some(dir) = &args.kafka_bin_dir {
            self.kafka_bin_dir = dir.clone();
        }
        if let Some(level) = &args.log_level {
            self.telemetry = self.telemetry.with_log_level(level.clone());
        }
        if args.json_logs {
            self.telemetry = self.telemetry.with_json_logs(true);
        }
        self
    }

    /// The explicit machine id, else the trimmed content of the machine id file.
    pub fn resolve_machine_id(&self) -> Result<String, SetupError> {
        if let Some(id) = &self.machine_id {
            return Ok(id.clone());
        }
        let raw = fs::read_to_string(&self.machine_id_file).map_err(|e| {
            SetupError::io(
                format!("Failed to read machine id from {}", self.machine_id_file.display()),
                e,
            )
        })?;
        let id = raw.trim();
        if id.is_empty() {
            return Err(SetupError::operation(
                codes::EINVAL,
                format!("Machine id file {} is empty", self.machine_id_file.display()),
            ));
        }
        Ok(id.to_string())
    }
}
