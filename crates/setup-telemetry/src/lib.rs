//! # Setup Telemetry
//!
//! Logging for the setup tooling. Every crate logs through `tracing`; this
//! crate installs the subscriber once, at process start.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use setup_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | unset | Full `EnvFilter` directive, wins over everything |
//! | `UTILS_SETUP_LOG_LEVEL` | `info` | Log level filter |
//! | `UTILS_SETUP_JSON_LOGS` | `false` | Emit JSON lines instead of text |
//! | `UTILS_SETUP_CONSOLE_OUTPUT` | `true` | Write logs to stderr at all |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}

/// Span covering one setup phase.
///
/// # Example
///
/// ```rust,ignore
/// let _span = setup_telemetry::phase_span!("config", config_url = %url).entered();
/// ```
#[macro_export]
macro_rules! phase_span {
    ($phase:expr $(, $($field:tt)*)?) => {
        tracing::info_span!("phase", phase = $phase $(, $($field)*)?)
    };
}
