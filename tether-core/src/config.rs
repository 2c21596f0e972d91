//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for a [`Runtime`](crate::reactive::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Name attached to log events emitted by this runtime.
    pub name: String,

    /// Upper bound on consecutive passes a synchronous flush runs before it
    /// gives up and leaves the remaining work for the next frame. Bounds
    /// the work done for cyclic graphs.
    pub max_flush_passes: usize,

    /// Log a warning when a keyed list sees the same key twice.
    pub warn_on_duplicate_keys: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "tether".to_string(),
            max_flush_passes: 100,
            warn_on_duplicate_keys: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = RuntimeConfig::from_json(r#"{ "max_flush_passes": 3 }"#).unwrap();
        assert_eq!(config.max_flush_passes, 3);
        assert_eq!(config.name, "tether");
        assert!(config.warn_on_duplicate_keys);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = RuntimeConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
