//! Data preprocessing module
//!
//! Turns raw loan-application columns into the fixed feature contract the
//! classifier consumes:
//! - Target detection and label normalization
//! - Missing value imputation (median / "Unknown")
//! - One-hot encoding of categorical columns, numeric passthrough

mod encoder;
mod imputer;
mod pipeline;
pub mod target;

pub use encoder::OneHotEncoder;
pub use imputer::{median, Imputer, UNKNOWN_CATEGORY};
pub use pipeline::FeaturePreprocessor;
pub use target::{binarize, detect_target, normalize_label, BinaryTarget, TARGET_ALIASES};

use serde::{Deserialize, Serialize};

/// Storage kind of a feature column, fixed once at training time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}
