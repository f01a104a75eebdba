//! Training engine: dataset in, fitted pipeline and schema out

use super::linear_models::LogisticRegression;
use super::metrics::{ClassificationReport, ModelMetrics};
use super::pipeline::ClassifierPipeline;
use super::split::stratified_split;
use super::TrainingConfig;
use crate::config::ArtifactPaths;
use crate::data::{load_table, RawTable};
use crate::error::{LoanError, Result};
use crate::preprocessing::{binarize, detect_target, FeaturePreprocessor, Imputer};
use crate::schema::FeatureSchema;
use crate::utils::write_atomic_all;
use ndarray::Array1;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Decision threshold used when scoring the hold-out split
const EVAL_THRESHOLD: f64 = 0.5;

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    schema: Option<FeatureSchema>,
    pipeline: Option<ClassifierPipeline>,
    metrics: Option<ModelMetrics>,
    report: Option<ClassificationReport>,
    class_counts: [usize; 2],
    dropped_rows: usize,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            schema: None,
            pipeline: None,
            metrics: None,
            report: None,
            class_counts: [0, 0],
            dropped_rows: 0,
        }
    }

    /// Load the CSV at `path` and fit on it
    pub fn fit_csv(&mut self, path: &Path) -> Result<&mut Self> {
        let table = load_table(path)?;
        info!(
            path = %path.display(),
            rows = table.n_rows(),
            columns = table.n_cols(),
            "Loaded training data"
        );
        self.fit(&table)
    }

    /// Fit the pipeline on a raw table and evaluate it on a held-out split
    pub fn fit(&mut self, table: &RawTable) -> Result<&mut Self> {
        self.config.validate()?;
        let start = Instant::now();

        // Target detection and label normalization
        let target_name = detect_target(&table.column_names())?;
        let target_column = table
            .column(&target_name)
            .ok_or_else(|| LoanError::DataError(format!("column '{}' vanished", target_name)))?;
        let target = binarize(target_column)?;
        let [negatives, positives] = target.class_counts();
        info!(
            target = %target_name,
            kept = target.labels.len(),
            dropped = target.dropped_rows,
            negatives,
            positives,
            "Binarized target"
        );

        let features = table.take_rows(&target.kept_rows)?.without_column(&target_name);
        let schema = FeatureSchema::from_table(&features, &target_name)?;
        if schema.is_empty() {
            return Err(LoanError::DataError(
                "dataset has no feature columns besides the target".to_string(),
            ));
        }
        info!(
            numeric = schema.num.len(),
            categorical = schema.cat.len(),
            "Partitioned feature columns"
        );

        // Fill values come from the whole label-filtered table
        let mut imputer = Imputer::new();
        imputer.fit(&features, &schema.num)?;

        let split = stratified_split(
            &target.labels,
            self.config.test_size,
            self.config.random_seed,
        )?;
        let train_table = features.take_rows(&split.train)?;
        let test_table = features.take_rows(&split.test)?;
        let labels_of = |rows: &[usize]| -> Vec<u8> {
            rows.iter().map(|&i| target.labels[i]).collect()
        };
        let y_train = labels_of(&split.train);
        let y_test = labels_of(&split.test);
        debug!(
            train = y_train.len(),
            test = y_test.len(),
            seed = self.config.random_seed,
            "Stratified split"
        );

        let mut preprocessor =
            FeaturePreprocessor::new(schema.num.clone(), schema.cat.clone(), imputer);
        preprocessor.fit(&train_table)?;
        let x_train = preprocessor.transform(&train_table)?;
        let y_train_f: Array1<f64> = y_train.iter().map(|&l| f64::from(l)).collect();

        let mut classifier = LogisticRegression::new()
            .with_c(self.config.c)
            .with_class_weight(self.config.class_weight)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol);
        classifier.fit(&x_train, &y_train_f)?;
        debug!(iterations = classifier.n_iter, "Fitted classifier");

        let pipeline = ClassifierPipeline::new(preprocessor, classifier)?;

        // Hold-out evaluation
        let proba = pipeline.predict_proba(&test_table)?.to_vec();
        let y_pred: Vec<u8> = proba
            .iter()
            .map(|&p| u8::from(p >= EVAL_THRESHOLD))
            .collect();

        let mut metrics = ModelMetrics::compute(&y_test, &y_pred, &proba);
        metrics.n_train = y_train.len();
        metrics.n_features = pipeline.preprocessor().n_features_out();
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        let report = ClassificationReport::compute(&y_test, &y_pred);

        info!(
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            auc = ?metrics.auc_roc,
            elapsed_secs = metrics.training_time_secs,
            "Evaluated on hold-out split"
        );

        self.class_counts = [negatives, positives];
        self.dropped_rows = target.dropped_rows;
        self.schema = Some(schema);
        self.pipeline = Some(pipeline);
        self.metrics = Some(metrics);
        self.report = Some(report);
        Ok(self)
    }

    /// Persist the fitted pipeline and the schema descriptor
    ///
    /// Both files are staged before either replaces an existing artifact.
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        let (pipeline, schema) = match (&self.pipeline, &self.schema) {
            (Some(p), Some(s)) => (p, s),
            _ => return Err(LoanError::ModelNotFitted),
        };
        let model = pipeline.to_json()?;
        let descriptor = schema.to_json()?;
        write_atomic_all(&[
            (paths.model.as_path(), model.as_bytes()),
            (paths.schema.as_path(), descriptor.as_bytes()),
        ])?;
        info!(
            model = %paths.model.display(),
            schema = %paths.schema.display(),
            "Saved artifacts"
        );
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    pub fn pipeline(&self) -> Option<&ClassifierPipeline> {
        self.pipeline.as_ref()
    }

    /// Get hold-out metrics
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    pub fn report(&self) -> Option<&ClassificationReport> {
        self.report.as_ref()
    }

    /// Label counts after normalization, `[negatives, positives]`
    pub fn class_counts(&self) -> [usize; 2] {
        self.class_counts
    }

    /// Rows excluded because their label had no mapping
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}
