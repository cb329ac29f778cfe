//! Configuration for the ext_proc engine
//!
//! All wiring is explicit: the engine and processors receive a [`Config`]
//! value at construction time instead of reading ambient process state.
//! Every field has a default so a minimal config file (or none at all)
//! yields a working server.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeulaError};

/// Root configuration for the ext_proc server
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Bind address for the gRPC listener (e.g. "0.0.0.0:50051")
    pub listen: String,

    /// Name of the processor to resolve from the registry
    pub processor: String,

    /// Header carrying the upstream request id
    pub request_id_header: String,

    /// How long in-flight streams may drain after a shutdown signal
    pub termination_grace_period_secs: u64,

    /// Maximum decoded gRPC message size in bytes (None = tonic default)
    pub max_message_size: Option<usize>,

    /// Per-processor behavior toggles
    pub options: ProcessingOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:50051".to_string(),
            processor: "noop".to_string(),
            request_id_header: "x-request-id".to_string(),
            termination_grace_period_secs: 30,
            max_message_size: None,
            options: ProcessingOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| SeulaError::Config(e.to_string()))
    }

    /// Grace period as a [`Duration`]
    pub fn termination_grace_period(&self) -> Duration {
        Duration::from_secs(self.termination_grace_period_secs)
    }
}

/// Behavior toggles consulted by the phase dispatcher
///
/// Read once when the processor is wired in; changing them mid-flight has
/// no effect on open streams.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Log request/response content at debug level
    pub log_stream: bool,

    /// Log each phase transition at info level
    pub log_phases: bool,

    /// Header for the request-side duration chain (None disables it)
    pub upstream_duration_header: Option<String>,

    /// Header for the response-side duration chain (None disables it)
    pub downstream_duration_header: Option<String>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            log_stream: false,
            log_phases: false,
            upstream_duration_header: None,
            downstream_duration_header: Some("x-extproc-duration-ns".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen, "0.0.0.0:50051");
        assert_eq!(config.processor, "noop");
        assert_eq!(config.request_id_header, "x-request-id");
        assert_eq!(config.termination_grace_period(), Duration::from_secs(30));
        assert_eq!(
            config.options.downstream_duration_header.as_deref(),
            Some("x-extproc-duration-ns")
        );
        assert!(config.options.upstream_duration_header.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            listen = "127.0.0.1:9000"
            processor = "dedup"

            [options]
            log_phases = true
            "#,
        )
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.processor, "dedup");
        assert!(config.options.log_phases);
        assert!(!config.options.log_stream);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.processor, "noop");
    }
}
