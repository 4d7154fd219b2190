//! Adapters Layer
//!
//! Concrete implementations of the outbound ports used by the binary.
//! Every adapter that talks to the system goes through a `ProcessRunner`,
//! so tests can substitute a scripted runner.

pub mod kafka_admin;
pub mod package_validator;
pub mod process;
pub mod systemd;

pub use kafka_admin::{KafkaCliAdmin, DEFAULT_KAFKA_BIN_DIR};
pub use package_validator::{PipPackage, SystemPackageValidator};
pub use process::TokioProcessRunner;
pub use systemd::SystemdServiceController;
