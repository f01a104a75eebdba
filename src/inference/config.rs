//! Inference configuration

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for serving predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Probability at or above which an application is approved
    pub classification_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            classification_threshold: 0.5,
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set classification threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.classification_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.classification_threshold) {
            return Err(LoanError::ConfigError(format!(
                "classification_threshold must be in [0, 1], got {}",
                self.classification_threshold
            )));
        }
        Ok(())
    }
}
