//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Settings for an [`Executor`](crate::Executor).
///
/// Deserializable so callers can embed it in their own configuration files;
/// missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Emit `debug` events with the resolved request, response status and
    /// headers, and validation issues.
    pub debug: bool,
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_quiet() {
        assert!(!ExecutorConfig::default().debug);
        assert!(ExecutorConfig::new().debug(true).debug);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ExecutorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExecutorConfig::default());
        let config: ExecutorConfig = serde_json::from_str(r#"{"debug":true}"#).unwrap();
        assert!(config.debug);
    }
}
