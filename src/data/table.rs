//! In-memory raw table with per-column storage kind

use crate::error::{LoanError, Result};
use crate::preprocessing::ColumnKind;
use polars::prelude::*;

/// Values of one column, tagged by storage kind
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

/// A named column of raw values
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    name: String,
    data: ColumnData,
}

impl RawColumn {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Text rendering of row `i`; integral numbers print without a decimal point
    pub fn text_at(&self, i: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(i).copied().flatten().map(format_number),
            ColumnData::Categorical(v) => v.get(i).cloned().flatten(),
        }
    }

    /// Numeric view of the column; text that does not parse becomes missing
    pub fn coerce_numeric(&self) -> Vec<Option<f64>> {
        match &self.data {
            ColumnData::Numeric(v) => v.clone(),
            ColumnData::Categorical(v) => v
                .iter()
                .map(|s| {
                    s.as_deref()
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .filter(|x| !x.is_nan())
                })
                .collect(),
        }
    }

    /// Text view of the column
    pub fn coerce_text(&self) -> Vec<Option<String>> {
        (0..self.len()).map(|i| self.text_at(i)).collect()
    }

    fn take(&self, indices: &[usize]) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            data,
        }
    }
}

/// Render a number the way a CSV cell would show it
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Column-oriented table of raw values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<RawColumn>,
    n_rows: usize,
}

impl RawTable {
    /// Build a table from columns of equal length
    pub fn new(columns: Vec<RawColumn>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(LoanError::ShapeError {
                expected: format!("{} rows", n_rows),
                actual: format!("{} rows in column '{}'", bad.len(), bad.name()),
            });
        }
        Ok(Self { columns, n_rows })
    }

    /// Convert a polars frame, fixing each column's kind from its dtype
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let name = col.name().to_string();

            let raw = match col.dtype() {
                DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
                DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
                DataType::Float32 | DataType::Float64 | DataType::Boolean => {
                    let casted = col.cast(&DataType::Float64)?;
                    let values: Vec<Option<f64>> = casted
                        .f64()?
                        .into_iter()
                        .map(|v| v.filter(|x| !x.is_nan()))
                        .collect();
                    RawColumn::numeric(name, values)
                }
                _ => {
                    let casted = col.cast(&DataType::String)?;
                    let values: Vec<Option<String>> = casted
                        .str()?
                        .into_iter()
                        .map(|v| v.map(|s| s.to_string()))
                        .collect();
                    RawColumn::categorical(name, values)
                }
            };
            columns.push(raw);
        }

        Self::new(columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Keep only the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(LoanError::DataError(format!(
                "row index {} out of bounds for {} rows",
                bad, self.n_rows
            )));
        }
        Ok(Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        })
    }

    /// Drop one column by name
    pub fn without_column(&self, name: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name() != name)
                .cloned()
                .collect(),
            n_rows: self.n_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dataframe() -> DataFrame {
        df!(
            "age" => &[Some(25i64), None, Some(35)],
            "income" => &[50000.0, 60000.0, 70000.0],
            "city" => &[Some("NYC"), Some("LA"), None],
            "verified" => &[true, false, true]
        )
        .unwrap()
    }

    #[test]
    fn test_kinds_follow_storage_type() {
        let table = RawTable::from_dataframe(&create_test_dataframe()).unwrap();
        assert_eq!(table.column("age").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("income").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("city").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(table.column("verified").unwrap().kind(), ColumnKind::Numeric);
    }

    #[test]
    fn test_nulls_preserved() {
        let table = RawTable::from_dataframe(&create_test_dataframe()).unwrap();
        assert_eq!(table.column("age").unwrap().null_count(), 1);
        assert_eq!(table.column("city").unwrap().null_count(), 1);
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn test_take_rows() {
        let table = RawTable::from_dataframe(&create_test_dataframe()).unwrap();
        let subset = table.take_rows(&[2, 0]).unwrap();
        assert_eq!(subset.n_rows(), 2);
        assert_eq!(
            subset.column("income").unwrap().data(),
            &ColumnData::Numeric(vec![Some(70000.0), Some(50000.0)])
        );
        assert!(table.take_rows(&[3]).is_err());
    }

    #[test]
    fn test_text_rendering_of_integral_numbers() {
        let col = RawColumn::numeric("x", vec![Some(1.0), Some(0.5), None]);
        assert_eq!(col.text_at(0).as_deref(), Some("1"));
        assert_eq!(col.text_at(1).as_deref(), Some("0.5"));
        assert_eq!(col.text_at(2), None);
    }

    #[test]
    fn test_coerce_numeric_from_text() {
        let col = RawColumn::categorical(
            "x",
            vec![Some("3".to_string()), Some("abc".to_string()), None],
        );
        assert_eq!(col.coerce_numeric(), vec![Some(3.0), None, None]);
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let result = RawTable::new(vec![
            RawColumn::numeric("a", vec![Some(1.0)]),
            RawColumn::numeric("b", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(matches!(result, Err(LoanError::ShapeError { .. })));
    }
}
