//! # Setup Service
//!
//! The orchestrator implementing the phase API, plus the steps several
//! phases share (cluster map copy, node key checks, bus connection).

mod helpers;
pub mod orchestrator;

pub use helpers::CLUSTER_MAP_INDEX;
pub use orchestrator::{SetupOrchestrator, CONFIG_INDEX, POST_INSTALL_INDEX};
