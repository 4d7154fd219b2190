//! # Utils Setup
//!
//! Lifecycle phases of the utils component: validate packages, seed the
//! component conf, copy the cluster node map, register message types, run the
//! test plan, and reset or clean up bus and log state.
//!
//! ## Phases
//!
//! | Phase | Effect |
//! |-------|--------|
//! | `post_install` | pip requirements checked, support bundle path set, node keys checked, cluster map copied |
//! | `config` | `log_dir` and shared support path set, cluster map copied, rsyslog restarted, log files created |
//! | `init` | `IEM` and `audit_messages` registered (existing ones tolerated) |
//! | `test` | `run_test` executed with the chosen plan |
//! | `reset` | every message type purged, `*.log` truncated |
//! | `cleanup` | every message type deregistered, `*.log` deleted on pre-factory |
//! | `validate`, `upgrade`, `pre_upgrade`, `post_upgrade` | log only |
//!
//! Every phase is idempotent and returns `Ok(())` or a `SetupError` carrying
//! an errno-style code.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Phases, requirements, node records, log file handling
//! - `ports/` - `SetupApi` (inbound) and collaborator traits (outbound)
//! - `context` - `ConfigContext`, the per-invocation config accessor
//! - `service/` - `SetupOrchestrator` implementing `SetupApi`
//! - `adapters/` - tokio processes, pip/rpm, systemctl, Kafka scripts
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use shared_bus::InMemoryMessageBus;
//! use shared_conf::{ConfUrl, JsonConfStore};
//! use utils_setup::*;
//!
//! let runner = Arc::new(TokioProcessRunner::new());
//! let orchestrator = SetupOrchestrator::new(
//!     SetupConfig::default(),
//!     Arc::new(SystemPackageValidator::new(runner.clone())),
//!     runner.clone(),
//!     Arc::new(InMemoryMessageBus::new()),
//!     Arc::new(SystemdServiceController::new(runner)),
//! )?;
//!
//! let template = ConfUrl::parse("json:///etc/cortx/cluster.conf")?;
//! let mut ctx = ConfigContext::new(Box::new(JsonConfStore::new()), machine_id, template.clone(), None)?;
//! orchestrator.init(&mut ctx, &template).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod context;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{
    KafkaCliAdmin, SystemPackageValidator, SystemdServiceController, TokioProcessRunner,
    DEFAULT_KAFKA_BIN_DIR,
};
pub use context::{ConfigContext, StorageKind, CLUSTER_INDEX, COMPONENT_INDEX};
pub use domain::{
    keys, PackageKind, PackageRequirement, ParseNameError, Phase, PhaseRequest, SetupConfig,
    UpgradeLevel, DEFAULT_TEST_PLAN,
};
pub use error::{codes, ServiceError, SetupError, ValidationError};
pub use ports::{
    CommandSpec, PackageValidator, ProcessOutput, ProcessRunner, ServiceController, SetupApi,
};
pub use service::{SetupOrchestrator, CLUSTER_MAP_INDEX, CONFIG_INDEX, POST_INSTALL_INDEX};
