//! Domain Layer
//!
//! Pure types and file helpers used by the phases. No collaborator calls.

pub mod config;
pub mod log_files;
pub mod node;
pub mod phase;
pub mod requirements;

pub use config::{keys, SetupConfig, DEFAULT_TEST_PLAN};
pub use node::{node_records, NodeRecord};
pub use phase::{ParseNameError, Phase, PhaseRequest, UpgradeLevel};
pub use requirements::{parse_manifest, read_manifests, PackageKind, PackageRequirement};
