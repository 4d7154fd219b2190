//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - the phase API
//! - Driven Ports (outbound) - process runner, package validator, service controller

pub mod inbound;
pub mod outbound;

pub use inbound::SetupApi;
pub use outbound::{CommandSpec, PackageValidator, ProcessOutput, ProcessRunner, ServiceController};
