//! Application configuration
//!
//! Everything the trainer and the predictor need is collected once into an
//! [`AppConfig`] and passed by reference; nothing is read from global state.

use crate::error::{LoanError, Result};
use crate::inference::InferenceConfig;
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the training dataset
pub const DEFAULT_DATA_PATH: &str = "data/loan.csv";
/// Default location of the serialized pipeline
pub const DEFAULT_MODEL_PATH: &str = "app/model.json";
/// Default location of the feature schema descriptor
pub const DEFAULT_SCHEMA_PATH: &str = "app/features.json";

/// File locations shared by the trainer and the predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Training CSV (also used for form defaults)
    pub data: PathBuf,
    /// Serialized classifier pipeline
    pub model: PathBuf,
    /// Feature schema descriptor
    pub schema: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
        }
    }
}

impl ArtifactPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, path: impl AsRef<Path>) -> Self {
        self.data = path.as_ref().to_path_buf();
        self
    }

    pub fn with_model(mut self, path: impl AsRef<Path>) -> Self {
        self.model = path.as_ref().to_path_buf();
        self
    }

    pub fn with_schema(mut self, path: impl AsRef<Path>) -> Self {
        self.schema = path.as_ref().to_path_buf();
        self
    }

    /// Place both artifacts inside `dir` using their default file names
    pub fn with_artifact_dir(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.with_model(dir.join("model.json"))
            .with_schema(dir.join("features.json"))
    }
}

/// Immutable configuration for one process run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: ArtifactPaths,
    pub training: TrainingConfig,
    pub inference: InferenceConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: ArtifactPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Check every section, returning the first violation
    pub fn validate(&self) -> Result<()> {
        if self.paths.model == self.paths.schema {
            return Err(LoanError::ConfigError(
                "model and schema artifacts must be different files".to_string(),
            ));
        }
        self.training.validate()?;
        self.inference.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = ArtifactPaths::default();
        assert_eq!(paths.data, PathBuf::from("data/loan.csv"));
        assert_eq!(paths.model, PathBuf::from("app/model.json"));
        assert_eq!(paths.schema, PathBuf::from("app/features.json"));
    }

    #[test]
    fn test_artifact_dir() {
        let paths = ArtifactPaths::new().with_artifact_dir("/tmp/out");
        assert_eq!(paths.model, PathBuf::from("/tmp/out/model.json"));
        assert_eq!(paths.schema, PathBuf::from("/tmp/out/features.json"));
        assert_eq!(paths.data, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_same_artifact_paths_rejected() {
        let paths = ArtifactPaths::new()
            .with_model("app/x.json")
            .with_schema("app/x.json");
        let config = AppConfig::new().with_paths(paths);
        assert!(matches!(config.validate(), Err(LoanError::ConfigError(_))));
    }
}
