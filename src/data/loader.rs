//! CSV loading

use super::RawTable;
use crate::error::{LoanError, Result};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Read a headed CSV file into a polars frame
///
/// Column dtypes are inferred from every row, so a late decimal or text value
/// widens the column instead of failing the parse.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LoanError::MissingInput(path.to_path_buf()));
    }

    let start = Instant::now();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded CSV"
    );
    Ok(df)
}

/// Read a headed CSV file straight into a [`RawTable`]
pub fn load_table(path: &Path) -> Result<RawTable> {
    let df = load_csv(path)?;
    RawTable::from_dataframe(&df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ColumnKind;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoanError::MissingInput(_)));
    }

    #[test]
    fn test_load_table_infers_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "age,income,gender,loan_status").unwrap();
        writeln!(file, "30,,Male,Approved").unwrap();
        writeln!(file, "45,52000.5,,Rejected").unwrap();
        drop(file);

        let table = load_table(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("age").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("income").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("income").unwrap().null_count(), 1);
        assert_eq!(table.column("gender").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(table.column("gender").unwrap().null_count(), 1);
    }

    #[test]
    fn test_late_value_widens_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "amount,purpose").unwrap();
        for i in 0..1500 {
            let amount = if i == 1200 { "1.5".to_string() } else { i.to_string() };
            let purpose = if i == 1300 { "car".to_string() } else { i.to_string() };
            writeln!(file, "{},{}", amount, purpose).unwrap();
        }
        drop(file);

        let table = load_table(&path).unwrap();
        assert_eq!(table.n_rows(), 1500);
        assert_eq!(table.column("amount").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("amount").unwrap().coerce_numeric()[1200], Some(1.5));
        assert_eq!(table.column("purpose").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(table.column("purpose").unwrap().text_at(1300).as_deref(), Some("car"));
    }
}
