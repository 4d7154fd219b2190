//! Error types for the setup subsystem

use std::path::PathBuf;

use shared_bus::MessageBusError;
use shared_conf::ConfError;
use thiserror::Error;

use crate::domain::PackageKind;

/// Error codes carried by `SetupError`.
pub mod codes {
    /// No such file or directory.
    pub const ENOENT: i32 = 2;
    /// I/O error.
    pub const EIO: i32 = 5;
    /// Invalid argument.
    pub const EINVAL: i32 = 22;
    /// A collaborator operation failed.
    pub const ERR_OP_FAILED: i32 = 0x1100;
    /// The external test runner reported failures.
    pub const ERR_TEST_FAILED: i32 = 0x1101;
}

/// Package, key or manifest validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Key {key} not found in {source_url}")]
    MissingKey { key: String, source_url: String },

    #[error("{kind} validation failed: {detail}")]
    Package { kind: PackageKind, detail: String },

    #[error("Malformed requirement in {path:?} line {line}: {reason}")]
    Manifest {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Test plan not found: {path:?}")]
    PlanNotFound { path: PathBuf },
}

/// Failure reported by a `ServiceController`.
#[derive(Debug, Error)]
#[error("Failed to restart {service}: {reason}")]
pub struct ServiceError {
    pub service: String,
    pub reason: String,
}

/// The single error type returned by every phase.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{message}")]
    Operation { code: i32, message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Utils test failed.\n Output : {output}\n Error : {error}\n Return Code : {return_code}")]
    TestFailed {
        output: String,
        error: String,
        return_code: i32,
    },

    #[error("{context}. {source}")]
    MessageBus {
        context: String,
        #[source]
        source: MessageBusError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config store error: {0}")]
    Conf(#[from] ConfError),
}

impl SetupError {
    pub fn operation(code: i32, message: impl Into<String>) -> Self {
        Self::Operation {
            code,
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn message_bus(context: impl Into<String>, source: MessageBusError) -> Self {
        Self::MessageBus {
            context: context.into(),
            source,
        }
    }

    /// Code reported to the caller (and used as the process exit status).
    pub fn code(&self) -> i32 {
        match self {
            Self::Operation { code, .. } => *code,
            Self::Validation(_) | Self::Conf(_) => codes::EINVAL,
            Self::TestFailed { .. } => codes::ERR_TEST_FAILED,
            Self::MessageBus { source, .. } => source.code,
            Self::Io { source, .. } => source.raw_os_error().unwrap_or(codes::EIO),
        }
    }
}
