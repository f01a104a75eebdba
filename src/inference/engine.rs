//! Inference engine implementation
//!
//! Holds the loaded pipeline and schema for the lifetime of a serving
//! session. Both are immutable after load and shared through `Arc`.

use super::{FeatureRow, InferenceConfig};
use crate::config::ArtifactPaths;
use crate::error::{LoanError, Result};
use crate::schema::FeatureSchema;
use crate::training::ClassifierPipeline;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Printed next to a missing artifact
pub const TRAIN_HINT: &str = "run `loan-approval train` first";

/// Thresholded decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Approved => write!(f, "Approved"),
            Verdict::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Outcome of one submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Positive-class probability in [0, 1]
    pub probability: f64,
    pub threshold: f64,
}

impl Prediction {
    /// Approved when the probability reaches the threshold
    pub fn approved(&self) -> bool {
        self.probability >= self.threshold
    }

    pub fn verdict(&self) -> Verdict {
        if self.approved() {
            Verdict::Approved
        } else {
            Verdict::Rejected
        }
    }
}

/// Serving-side model holder
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    config: InferenceConfig,
    schema: Arc<FeatureSchema>,
    pipeline: Arc<ClassifierPipeline>,
}

fn require(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(LoanError::ArtifactMissing {
            path: path.to_path_buf(),
            hint: TRAIN_HINT.to_string(),
        })
    }
}

impl InferenceEngine {
    /// Pair a schema with a pipeline, refusing mismatched column sets
    pub fn new(
        config: InferenceConfig,
        schema: FeatureSchema,
        pipeline: ClassifierPipeline,
    ) -> Result<Self> {
        config.validate()?;
        if pipeline.numeric_columns() != schema.num.as_slice() {
            return Err(LoanError::SchemaMismatch(format!(
                "schema numeric columns {:?} differ from model columns {:?}",
                schema.num,
                pipeline.numeric_columns()
            )));
        }
        if pipeline.categorical_columns() != schema.cat.as_slice() {
            return Err(LoanError::SchemaMismatch(format!(
                "schema categorical columns {:?} differ from model columns {:?}",
                schema.cat,
                pipeline.categorical_columns()
            )));
        }

        Ok(Self {
            config,
            schema: Arc::new(schema),
            pipeline: Arc::new(pipeline),
        })
    }

    /// Load both artifacts from disk
    pub fn load(paths: &ArtifactPaths, config: InferenceConfig) -> Result<Self> {
        require(&paths.model)?;
        require(&paths.schema)?;

        let start = Instant::now();
        let pipeline = ClassifierPipeline::load(&paths.model)?;
        let schema = FeatureSchema::load(&paths.schema)?;
        let engine = Self::new(config, schema, pipeline)?;

        info!(
            model = %paths.model.display(),
            columns = engine.schema.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded model artifacts"
        );
        Ok(engine)
    }

    /// Score one row
    pub fn predict(&self, row: &FeatureRow) -> Result<Prediction> {
        let probability = self.pipeline.predict_proba_row(row)?;
        if !probability.is_finite() {
            return Err(LoanError::InferenceError(format!(
                "model produced a non-finite probability ({})",
                probability
            )));
        }
        let prediction = Prediction {
            probability,
            threshold: self.config.classification_threshold,
        };
        debug!(probability, verdict = %prediction.verdict(), "Scored feature row");
        Ok(prediction)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn pipeline(&self) -> &ClassifierPipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}
