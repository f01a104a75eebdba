//! Fitted preprocessing + classifier, persisted as one artifact

use super::linear_models::LogisticRegression;
use crate::data::RawTable;
use crate::error::{LoanError, Result};
use crate::inference::FeatureRow;
use crate::preprocessing::FeaturePreprocessor;
use crate::utils::write_atomic;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Maps raw feature rows to approval probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierPipeline {
    preprocessor: FeaturePreprocessor,
    classifier: LogisticRegression,
}

impl ClassifierPipeline {
    /// Combine a fitted preprocessor and classifier
    pub fn new(preprocessor: FeaturePreprocessor, classifier: LogisticRegression) -> Result<Self> {
        if !preprocessor.is_fitted() || !classifier.is_fitted {
            return Err(LoanError::ModelNotFitted);
        }
        let width = classifier.coefficients.as_ref().map(|c| c.len()).unwrap_or(0);
        if width != preprocessor.n_features_out() {
            return Err(LoanError::ShapeError {
                expected: format!("{} encoded features", preprocessor.n_features_out()),
                actual: format!("{} coefficients", width),
            });
        }
        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    /// Positive-class probability for each row of an encoded matrix
    pub fn predict_proba_encoded(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.classifier.predict_proba(x)
    }

    /// Positive-class probability for each row of a raw table
    pub fn predict_proba(&self, table: &RawTable) -> Result<Array1<f64>> {
        let x = self.preprocessor.transform(table)?;
        self.classifier.predict_proba(&x)
    }

    /// Positive-class probability of a single row
    pub fn predict_proba_row(&self, row: &FeatureRow) -> Result<f64> {
        let x = self.preprocessor.transform_row(row)?;
        let proba = self.classifier.predict_proba(&x)?;
        proba
            .first()
            .copied()
            .ok_or_else(|| LoanError::InferenceError("empty prediction".to_string()))
    }

    pub fn numeric_columns(&self) -> &[String] {
        self.preprocessor.numeric_columns()
    }

    pub fn categorical_columns(&self) -> &[String] {
        self.preprocessor.categorical_columns()
    }

    pub fn preprocessor(&self) -> &FeaturePreprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Save the pipeline as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json()?.as_bytes())?;
        info!(path = %path.display(), "Saved model pipeline");
        Ok(())
    }

    /// Load a pipeline saved by [`ClassifierPipeline::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let pipeline: Self = serde_json::from_str(&json)?;
        Ok(pipeline)
    }
}
