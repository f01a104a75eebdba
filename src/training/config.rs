//! Training configuration

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};

/// Sample weighting applied by the classifier loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every row weighs 1
    Uniform,
    /// Rows weigh `n_samples / (n_classes * n_samples_in_class)`
    Balanced,
}

/// Configuration for model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the stratified split
    pub random_seed: u64,

    /// Inverse L2 regularization strength
    pub c: f64,

    /// Maximum solver iterations
    pub max_iter: usize,

    /// Convergence tolerance on the Newton step
    pub tol: f64,

    /// Loss weighting per class
    pub class_weight: ClassWeight,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
            c: 1.0,
            max_iter: 1000,
            tol: 1e-8,
            class_weight: ClassWeight::Balanced,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set split seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set solver convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(LoanError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !(self.c > 0.0) {
            return Err(LoanError::ConfigError(format!(
                "c must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(LoanError::ConfigError("max_iter must be at least 1".to_string()));
        }
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(LoanError::ConfigError(format!(
                "tol must be a positive finite number, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}
