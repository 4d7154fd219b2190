//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for setup logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or an `EnvFilter` directive
    pub log_level: String,

    /// Whether to write logs to stderr
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "utils_setup".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `UTILS_SETUP_LOG_LEVEL`: Log level (default: info)
    /// - `UTILS_SETUP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `UTILS_SETUP_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: defaults.service_name,

            log_level: lookup("UTILS_SETUP_LOG_LEVEL").unwrap_or(defaults.log_level),

            console_output: lookup("UTILS_SETUP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("UTILS_SETUP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Override the log level (e.g. from a CLI flag).
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    #[must_use]
    pub fn with_json_logs(mut self, json_logs: bool) -> Self {
        self.json_logs = json_logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "utils_setup");
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_from_lookup() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("UTILS_SETUP_LOG_LEVEL", "debug"),
            ("UTILS_SETUP_JSON_LOGS", "1"),
            ("UTILS_SETUP_CONSOLE_OUTPUT", "FALSE"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert!(!config.console_output);
    }

    #[test]
    fn test_empty_lookup_gives_defaults() {
        assert_eq!(
            TelemetryConfig::from_lookup(|_| None),
            TelemetryConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = TelemetryConfig::default()
            .with_log_level("warn")
            .with_json_logs(true);
        assert_eq!(config.log_level, "warn");
        assert!(config.json_logs);
    }
}
