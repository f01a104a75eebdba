//! Missing value imputation

use crate::data::RawTable;
use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Fill value for missing categorical entries
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Median of the given values, `None` when empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Per-column median imputation for numeric columns, constant for categorical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    numeric_fill: BTreeMap<String, f64>,
    categorical_fill: String,
    is_fitted: bool,
}

impl Default for Imputer {
    fn default() -> Self {
        Self::new()
    }
}

impl Imputer {
    pub fn new() -> Self {
        Self {
            numeric_fill: BTreeMap::new(),
            categorical_fill: UNKNOWN_CATEGORY.to_string(),
            is_fitted: false,
        }
    }

    /// Learn the median of every numeric column from non-missing values
    pub fn fit(&mut self, table: &RawTable, numeric_columns: &[String]) -> Result<&mut Self> {
        self.numeric_fill.clear();

        for name in numeric_columns {
            let column = table
                .column(name)
                .ok_or_else(|| LoanError::SchemaMismatch(format!("missing column '{}'", name)))?;
            let present: Vec<f64> = column.coerce_numeric().into_iter().flatten().collect();

            let fill = match median(&present) {
                Some(m) => m,
                None => {
                    warn!(column = %name, "Numeric column has no values, imputing 0.0");
                    0.0
                }
            };
            debug!(column = %name, median = fill, missing = column.len() - present.len(), "Fitted imputer");
            self.numeric_fill.insert(name.clone(), fill);
        }

        self.is_fitted = true;
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Learned fill value for a numeric column
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.numeric_fill.get(column).copied()
    }

    pub fn categorical_fill(&self) -> &str {
        &self.categorical_fill
    }

    /// Replace a missing or NaN numeric entry with the column median
    pub fn numeric_value(&self, column: &str, value: Option<f64>) -> Result<f64> {
        match value {
            Some(v) if !v.is_nan() => Ok(v),
            _ => self.fill_value(column).ok_or(LoanError::ModelNotFitted),
        }
    }

    /// Impute a whole numeric column
    pub fn impute_numeric(&self, column: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(LoanError::ModelNotFitted);
        }
        values.iter().map(|&v| self.numeric_value(column, v)).collect()
    }

    /// Replace a missing categorical entry with the sentinel
    pub fn categorical_value(&self, value: Option<&str>) -> String {
        value.map(str::to_string).unwrap_or_else(|| self.categorical_fill.clone())
    }

    /// Impute a whole categorical column
    pub fn impute_categorical(&self, values: &[Option<String>]) -> Vec<String> {
        values.iter().map(|v| self.categorical_value(v.as_deref())).collect()
    }
}
