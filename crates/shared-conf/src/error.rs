//! Error types for the configuration store

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing keys/URLs or accessing a store.
#[derive(Debug, Error)]
pub enum ConfError {
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid config url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported config url scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("Config index not loaded: {index}")]
    IndexNotLoaded { index: String },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Key {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config document {path:?} must be a JSON object at the top level")]
    InvalidDocument { path: PathBuf },
}
