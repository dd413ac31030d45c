//! Configuration for the request engine.

use serde::{Deserialize, Serialize};

use dapstream_wire::DEFAULT_MAX_STRING_LEN;

/// Configuration for an [`crate::Engine`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Include module targets in log lines.
    pub log_target: bool,

    /// Byte budget for one data response (`None` = unlimited).
    pub max_response_bytes: Option<u64>,

    /// Largest string length prefix accepted when decoding.
    pub max_string_len: u32,

    /// Validate the dataset before answering a request.
    pub check_semantics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_target: false,
            max_response_bytes: None,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            check_semantics: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration for development with verbose logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_filter: "debug".to_string(),
            log_target: true,
            ..Self::default()
        }
    }

    /// Creates a configuration with tight limits for untrusted clients.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_target: false,
            max_response_bytes: Some(64 * 1024 * 1024),
            max_string_len: 1024 * 1024,
            check_semantics: true,
        }
    }

    /// Builder method to set the log filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Builder method to enable/disable module targets in log lines.
    #[must_use]
    pub fn with_log_target(mut self, target: bool) -> Self {
        self.log_target = target;
        self
    }

    /// Builder method to set the response byte budget.
    #[must_use]
    pub fn with_max_response_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Builder method to set the decoded string length guard.
    #[must_use]
    pub fn with_max_string_len(mut self, max: u32) -> Self {
        self.max_string_len = max;
        self
    }

    /// Builder method to enable/disable semantic checks per request.
    #[must_use]
    pub fn with_check_semantics(mut self, check: bool) -> Self {
        self.check_semantics = check;
        self
    }
}
