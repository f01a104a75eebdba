//! Model training module
//!
//! Provides the offline half of the workflow:
//! - Stratified, seeded train/test split
//! - Class-weighted L2 logistic regression (Newton solver)
//! - Hold-out metrics and a per-class report
//! - The persisted [`ClassifierPipeline`]

mod config;
mod engine;
mod metrics;
mod pipeline;
pub mod linear_models;
pub mod split;

pub use config::{ClassWeight, TrainingConfig};
pub use engine::TrainEngine;
pub use linear_models::LogisticRegression;
pub use metrics::{roc_auc, ClassScores, ClassificationReport, ConfusionCounts, ModelMetrics};
pub use pipeline::ClassifierPipeline;
pub use split::{stratified_split, SplitIndices};
