use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid trials per session before input is ignored
pub const MAX_ATTEMPTS: usize = 5;
pub const MIN_DELAY_MS: u64 = 1000;
pub const MAX_DELAY_MS: u64 = 4000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("stimulus delay range {min}..={max} ms is inverted")]
    InvertedDelayRange { min: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub max_attempts: usize,
    /// Inclusive bounds for the randomized stimulus delay
    pub delay_range_ms: (u64, u64),
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay_range_ms: (MIN_DELAY_MS, MAX_DELAY_MS),
        }
    }
}

impl ReactionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        let (min, max) = self.delay_range_ms;
        if min > max {
            return Err(ConfigError::InvertedDelayRange { min, max });
        }
        Ok(())
    }
}
