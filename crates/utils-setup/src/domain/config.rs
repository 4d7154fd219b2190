//! Orchestrator configuration and well-known config keys.
//!
//! # Example
//!
//! ```ignore
//! use utils_setup::domain::SetupConfig;
//!
//! let config = SetupConfig {
//!     support_bundle_dir: "/tmp/support_bundle".into(),
//!     ..SetupConfig::default()
//! };
//! config.validate()?;
//! ```

use std::path::PathBuf;

use shared_bus::DEFAULT_PARTITIONS;

use crate::error::{codes, SetupError};

/// Test plan run when none is named.
pub const DEFAULT_TEST_PLAN: &str = "sanity";

/// Keys read and written by the phases.
pub mod keys {
    /// Component conf: install prefix of the utils package.
    pub const INSTALL_PATH: &str = "install_path";
    /// Component conf: base directory for utils logs.
    pub const LOG_DIR: &str = "log_dir";
    /// Component conf: local support bundle directory.
    pub const SUPPORT_LOCAL_PATH: &str = "support>local_path";
    /// Component conf: shared support bundle directory.
    pub const SUPPORT_SHARED_PATH: &str = "support>shared_path";
    /// Component conf: optional override of the test plan directory.
    pub const TEST_PLAN_DIR: &str = "test>plan_dir";
    /// Template: name of the message bus backend.
    pub const MESSAGE_BUS_BACKEND: &str = "cortx>utils>message_bus_backend";
    /// Template: per-node records keyed by machine id.
    pub const NODE_MAP: &str = "node";

    /// Template: endpoints of the given message bus backend.
    pub fn endpoints(backend: &str) -> String {
        format!("cortx>external>{}>endpoints", backend)
    }

    /// Template: a field of the node record for `machine_id`.
    pub fn node_field(machine_id: &str, field: &str) -> String {
        format!("node>{}>{}", machine_id, field)
    }

    /// Cluster config: storage path of the given kind.
    pub fn storage(kind: &str) -> String {
        format!("cortx>common>storage>{}", kind)
    }
}

/// Fixed knobs of the setup phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupConfig {
    /// Default support bundle directory written by post_install
    pub support_bundle_dir: PathBuf,
    /// Log daemon restarted by config
    pub rsyslog_service: String,
    /// Package that must be installed before running tests
    pub test_package: String,
    /// Message types registered by init
    pub message_types: Vec<String>,
    /// Partition count of each registered message type
    pub partitions: u32,
    /// Log subdirectories created by config
    pub log_subdirs: Vec<String>,
    /// Requirement manifests read by post_install, relative to `<utils>/conf`
    pub requirement_manifests: Vec<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            support_bundle_dir: PathBuf::from("/var/log/cortx/support_bundle"),
            rsyslog_service: "rsyslog.service".to_string(),
            test_package: "cortx-py-utils-test".to_string(),
            message_types: vec!["IEM".to_string(), "audit_messages".to_string()],
            partitions: DEFAULT_PARTITIONS,
            log_subdirs: vec!["message_bus".to_string(), "iem".to_string()],
            requirement_manifests: vec![
                "python_requirements.txt".to_string(),
                "python_requirements.ext.txt".to_string(),
            ],
        }
    }
}

impl SetupConfig {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.partitions == 0 {
            return Err(SetupError::operation(
                codes::EINVAL,
                "partitions must be at least 1",
            ));
        }
        if self.message_types.iter().any(|t| t.trim().is_empty()) {
            return Err(SetupError::operation(
                codes::EINVAL,
                "message type names must not be empty",
            ));
        }
        if self.log_subdirs.iter().any(|d| d.is_empty() || d.contains('/')) {
            return Err(SetupError::operation(
                codes::EINVAL,
                "log subdirectories must be single path components",
            ));
        }
        Ok(())
    }
}
