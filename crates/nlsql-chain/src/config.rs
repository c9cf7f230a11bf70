//! Chain configuration

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Settings fixed when a chain is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Total execution attempts allowed for recoverable errors (>= 1)
    pub max_tries: usize,
    /// Row-limit hint injected into the translation prompt
    pub top_k: usize,
    /// Return the generated queries and execution outcomes with the answer
    pub return_intermediate_steps: bool,
    /// Return the execution result verbatim and skip the answer step
    pub return_raw_result: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_tries: 1,
            top_k: 5,
            return_intermediate_steps: false,
            return_raw_result: false,
        }
    }
}

impl ChainConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt bound
    pub fn max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Set the row-limit hint
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Enable/disable intermediate step tracing
    pub fn return_intermediate_steps(mut self, enabled: bool) -> Self {
        self.return_intermediate_steps = enabled;
        self
    }

    /// Enable/disable returning the raw execution result
    pub fn return_raw_result(mut self, enabled: bool) -> Self {
        self.return_raw_result = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 {
            return Err(ChainError::Config(
                "max_tries must be at least 1".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(ChainError::Config("top_k must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.max_tries, 1);
        assert_eq!(config.top_k, 5);
        assert!(!config.return_intermediate_steps);
        assert!(!config.return_raw_result);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_tries_rejected() {
        let config = ChainConfig::new().max_tries(0);
        assert!(matches!(config.validate(), Err(ChainError::Config(_))));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = ChainConfig::new().top_k(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ChainConfig = serde_json::from_str(r#"{"max_tries": 3}"#).unwrap();
        assert_eq!(config.max_tries, 3);
        assert_eq!(config.top_k, 5);
    }
}
