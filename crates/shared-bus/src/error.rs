//! Message bus errors

use std::fmt;
use thiserror::Error;

/// Category of a message bus failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageBusErrorKind {
    /// The message type is already registered.
    TopicAlreadyExists,
    /// The message type is not registered.
    UnknownTopic,
    /// None of the configured endpoints answered.
    Unreachable,
    /// An admin call was made before `init`.
    NotInitialized,
    /// Arguments rejected before reaching the backend.
    InvalidRequest,
    /// Any other backend failure.
    Backend,
}

impl MessageBusErrorKind {
    /// errno-style code reported when the backend supplies none.
    pub fn default_code(&self) -> i32 {
        match self {
            Self::TopicAlreadyExists => 17, // EEXIST
            Self::UnknownTopic => 2,        // ENOENT
            Self::Unreachable => 111,       // ECONNREFUSED
            Self::NotInitialized => 22,     // EINVAL
            Self::InvalidRequest => 22,     // EINVAL
            Self::Backend => 5,             // EIO
        }
    }
}

impl fmt::Display for MessageBusErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TopicAlreadyExists => "TOPIC_ALREADY_EXISTS",
            Self::UnknownTopic => "UNKNOWN_TOPIC",
            Self::Unreachable => "UNREACHABLE",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Backend => "BACKEND_ERROR",
        };
        f.write_str(s)
    }
}

/// Error reported by a `MessageBusAdmin`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {desc} (rc={code})")]
pub struct MessageBusError {
    pub kind: MessageBusErrorKind,
    pub code: i32,
    pub desc: String,
}

impl MessageBusError {
    pub fn new(kind: MessageBusErrorKind, desc: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            desc: desc.into(),
        }
    }

    /// Override the code with one reported by the backend.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == MessageBusErrorKind::TopicAlreadyExists
    }
}
