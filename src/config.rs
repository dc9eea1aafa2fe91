//! Database configuration.
//!
//! ```json
//! {
//!   "max_retry_on_conflict": 5,
//!   "retry_scope": "conflict_only",
//!   "backend": { "kind": "memory", "native_dates": false }
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::BackendConfig;
use crate::Result;

/// Default retry ceiling for conflicting transactions.
pub const DEFAULT_MAX_RETRY_ON_CONFLICT: u32 = 5;

/// Which transaction failures are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
    /// Only commit conflicts (`Error::Conflict`) are retried; anything else
    /// fails the transaction on the first attempt.
    #[default]
    ConflictOnly,
    /// Every failure is retried until the ceiling is reached.
    AnyError,
}

impl RetryScope {
    pub fn should_retry(&self, error: &crate::Error) -> bool {
        match self {
            RetryScope::ConflictOnly => error.is_conflict(),
            RetryScope::AnyError => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Attempts per transaction. `0` is treated as `1`.
    pub max_retry_on_conflict: u32,
    pub retry_scope: RetryScope,
    pub backend: BackendConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_retry_on_conflict: DEFAULT_MAX_RETRY_ON_CONFLICT,
            retry_scope: RetryScope::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_max_retry_on_conflict(mut self, max: u32) -> Self {
        self.max_retry_on_conflict = max;
        self
    }

    pub fn with_retry_scope(mut self, scope: RetryScope) -> Self {
        self.retry_scope = scope;
        self
    }

    /// Number of attempts a transaction gets.
    pub fn attempts(&self) -> u32 {
        self.max_retry_on_conflict.max(1)
    }
}
