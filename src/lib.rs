//! Loan Approval - binary classifier for loan applications
//!
//! This crate provides an offline trainer and an interactive predictor:
//! - Target detection and label normalization
//! - Median / "Unknown" imputation and one-hot encoding
//! - Class-weighted logistic regression with a seeded stratified split
//! - A terminal prediction form driven by the persisted artifacts
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - CSV loading into typed raw columns
//! - [`preprocessing`] - Target normalization, imputation, encoding
//! - [`schema`] - Feature schema descriptor shared by trainer and predictor
//! - [`training`] - Split, classifier, metrics and the persisted pipeline
//! - [`inference`] - Artifact loading, feature rows and scoring
//!
//! ## Services
//! - [`ui`] - Interactive prediction form
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`config`] - Run configuration
//! - [`utils`] - Atomic artifact writes

// Core error handling
pub mod error;
pub mod config;

// Core modules
pub mod data;
pub mod preprocessing;
pub mod schema;
pub mod training;
pub mod inference;

// Services
pub mod ui;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{LoanError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{LoanError, Result};

    // Configuration
    pub use crate::config::{AppConfig, ArtifactPaths};

    // Data
    pub use crate::data::{load_table, RawColumn, RawTable};

    // Preprocessing
    pub use crate::preprocessing::{ColumnKind, FeaturePreprocessor, Imputer, OneHotEncoder};
    pub use crate::schema::FeatureSchema;

    // Training
    pub use crate::training::{ClassifierPipeline, ModelMetrics, TrainEngine, TrainingConfig};

    // Inference
    pub use crate::inference::{
        FeatureRow, FeatureValue, FormDefaults, InferenceConfig, InferenceEngine, Prediction,
        RowBuilder, Verdict,
    };

    // Form
    pub use crate::ui::{FormMode, Prompter, ServingSession};
}
