//! Integration tests for the trainer: CSV in, artifacts out

use loan_approval::config::{AppConfig, ArtifactPaths};
use loan_approval::data::RawTable;
use loan_approval::error::LoanError;
use loan_approval::schema::FeatureSchema;
use loan_approval::training::{ClassifierPipeline, TrainEngine, TrainingConfig};
use polars::prelude::*;
use std::path::{Path, PathBuf};

fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .unwrap();
    path
}

/// Income and credit score both rise with the row index; the upper half is approved
fn numeric_frame(n: usize) -> DataFrame {
    let age: Vec<i64> = (0..n).map(|i| 21 + (i * 7 % 40) as i64).collect();
    let income: Vec<f64> = (0..n).map(|i| 18000.0 + 1200.0 * i as f64).collect();
    let credit: Vec<i64> = (0..n).map(|i| 450 + 8 * i as i64).collect();
    let status: Vec<&str> = (0..n)
        .map(|i| match (i >= n / 2, i % 2 == 0) {
            (true, true) => "Y",
            (true, false) => "Approved",
            (false, true) => "N",
            (false, false) => "rejected",
        })
        .collect();

    df!(
        "age" => age,
        "income" => income,
        "credit_score" => credit,
        "loan_status" => status
    )
    .unwrap()
}

fn config_for(dir: &Path, data: &Path) -> AppConfig {
    AppConfig::new().with_paths(
        ArtifactPaths::new()
            .with_data(data)
            .with_artifact_dir(dir.join("app")),
    )
}

#[test]
fn test_end_to_end_numeric_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "loan.csv", &mut numeric_frame(50));
    let config = config_for(dir.path(), &data);

    let mut engine = TrainEngine::new(config.training.clone());
    engine.fit_csv(&config.paths.data).unwrap();
    engine.save(&config.paths).unwrap();

    let schema = FeatureSchema::load(&config.paths.schema).unwrap();
    assert_eq!(schema.num, ["age", "income", "credit_score"]);
    assert!(schema.cat.is_empty());
    assert_eq!(schema.target, "loan_status");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.paths.schema).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "num": ["age", "income", "credit_score"],
            "cat": [],
            "target": "loan_status"
        })
    );

    // The most clearly approved training row scores at or above the threshold
    let pipeline = ClassifierPipeline::load(&config.paths.model).unwrap();
    let table = RawTable::from_dataframe(&numeric_frame(50)).unwrap();
    let proba = pipeline.predict_proba(&table).unwrap();
    assert!(proba[49] >= 0.5);
    assert!(proba[0] < 0.5);
}

#[test]
fn test_same_seed_same_metrics() {
    let table = RawTable::from_dataframe(&numeric_frame(60)).unwrap();
    let config = TrainingConfig::new().with_random_seed(11).with_test_size(0.25);

    let mut a = TrainEngine::new(config.clone());
    let mut b = TrainEngine::new(config);
    a.fit(&table).unwrap();
    b.fit(&table).unwrap();

    let (ma, mb) = (a.metrics().unwrap(), b.metrics().unwrap());
    assert_eq!(ma.accuracy, mb.accuracy);
    assert_eq!(ma.f1_score, mb.f1_score);
    assert_eq!(ma.auc_roc, mb.auc_roc);
    assert_eq!(ma.confusion, mb.confusion);
    assert_eq!(ma.n_test, 15);
    assert_eq!(a.report(), b.report());
    assert_eq!(
        a.pipeline().unwrap().classifier().coefficients,
        b.pipeline().unwrap().classifier().coefficients
    );
}

#[test]
fn test_single_surviving_class_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut df = df!(
        "income" => &[1.0, 2.0, 3.0, 4.0],
        "Target" => &["yes", "maybe", "YES", "later"]
    )
    .unwrap();
    let data = write_csv(dir.path(), "loan.csv", &mut df);
    let config = config_for(dir.path(), &data);

    let mut engine = TrainEngine::new(config.training.clone());
    let err = engine.fit_csv(&data).unwrap_err();
    match err {
        LoanError::NonBinaryTarget { seen } => {
            assert_eq!(seen, ["later", "maybe", "yes"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.save(&config.paths).is_err());
    assert!(!config.paths.model.exists());
    assert!(!config.paths.schema.exists());
}

#[test]
fn test_missing_numeric_filled_with_median() {
    let df = df!(
        "income" => &[Some(10.0), None, Some(30.0), Some(50.0), Some(70.0), Some(90.0), None, Some(20.0)],
        "city" => &[Some("LA"), Some("NYC"), None, Some("LA"), Some("SF"), Some("NYC"), Some("LA"), Some("SF")],
        "label" => &[0i64, 0, 0, 0, 1, 1, 1, 1]
    )
    .unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::new().with_test_size(0.25));
    engine.fit(&table).unwrap();

    let preprocessor = engine.pipeline().unwrap().preprocessor();
    // Median of 10, 20, 30, 50, 70, 90
    assert_eq!(preprocessor.imputer().fill_value("income"), Some(40.0));
    assert_eq!(preprocessor.imputer().categorical_fill(), "Unknown");
    assert_eq!(engine.schema().unwrap().cat, ["city"]);
}

#[test]
fn test_numeric_binary_target_is_kept() {
    let df = df!(
        "amount" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "LoanStatus" => &[0i64, 0, 0, 0, 0, 1, 1, 1, 1, 1]
    )
    .unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::default());
    engine.fit(&table).unwrap();
    assert_eq!(engine.class_counts(), [5, 5]);
    assert_eq!(engine.dropped_rows(), 0);
    assert_eq!(engine.schema().unwrap().target, "LoanStatus");
}

#[test]
fn test_unmapped_labels_are_dropped() {
    let df = df!(
        "amount" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        "loan_status" => &[Some("no"), Some("No"), Some("pending"), None, Some("yes"), Some(" Yes "), Some("denied"), Some("approve")]
    )
    .unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::default());
    engine.fit(&table).unwrap();
    assert_eq!(engine.dropped_rows(), 2);
    assert_eq!(engine.class_counts(), [3, 3]);
}

#[test]
fn test_missing_target_column() {
    let df = df!("amount" => &[1.0, 2.0], "outcome" => &["yes", "no"]).unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();
    let mut engine = TrainEngine::new(TrainingConfig::default());
    assert!(matches!(
        engine.fit(&table),
        Err(LoanError::TargetNotFound { .. })
    ));
}

#[test]
fn test_missing_csv() {
    let mut engine = TrainEngine::new(TrainingConfig::default());
    let err = engine.fit_csv(Path::new("no/such/loan.csv")).unwrap_err();
    assert!(matches!(err, LoanError::MissingInput(_)));
}

#[test]
fn test_class_with_one_row_cannot_be_split() {
    let df = df!(
        "amount" => &[1.0, 2.0, 3.0, 4.0, 5.0],
        "label" => &["no", "no", "no", "no", "yes"]
    )
    .unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();
    let mut engine = TrainEngine::new(TrainingConfig::default());
    assert!(matches!(engine.fit(&table), Err(LoanError::DataError(_))));
}

#[test]
fn test_late_decimal_in_integer_column_trains() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("loan.csv");
    let mut csv = String::from("amount,loan_status\n");
    for i in 0..1100 {
        let amount = if i == 1050 { "1.5".to_string() } else { (i % 500).to_string() };
        let status = if i % 500 < 250 { "Approved" } else { "Rejected" };
        csv.push_str(&format!("{},{}\n", amount, status));
    }
    std::fs::write(&data, csv).unwrap();

    let config = config_for(dir.path(), &data);
    let mut engine = TrainEngine::new(config.training.clone());
    engine.fit_csv(&config.paths.data).unwrap();
    engine.save(&config.paths).unwrap();

    let schema = FeatureSchema::load(&config.paths.schema).unwrap();
    assert_eq!(schema.num, ["amount"]);
    assert_eq!(engine.class_counts(), [500, 600]);
}

#[test]
fn test_failed_schema_write_leaves_no_model() {
    let dir = tempfile::tempdir().unwrap();
    let table = RawTable::from_dataframe(&numeric_frame(40)).unwrap();
    let mut engine = TrainEngine::new(TrainingConfig::default());
    engine.fit(&table).unwrap();

    // The schema's parent directory is a regular file, so it cannot be written
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let paths = ArtifactPaths::new()
        .with_model(dir.path().join("app").join("model.json"))
        .with_schema(blocker.join("features.json"));

    assert!(engine.save(&paths).is_err());
    assert!(!paths.model.exists());
}
