//! Inference module
//!
//! Loads the persisted pipeline and schema, validates single feature rows
//! and scores them against the approval threshold.

mod config;
mod defaults;
mod engine;
mod row;

pub use config::InferenceConfig;
pub use defaults::FormDefaults;
pub use engine::{InferenceEngine, Prediction, Verdict, TRAIN_HINT};
pub use row::{FeatureRow, FeatureValue, RowBuilder};
