//! Column transformer: imputation, one-hot encoding and numeric passthrough

use super::{Imputer, OneHotEncoder};
use crate::data::RawTable;
use crate::error::{LoanError, Result};
use crate::inference::{FeatureRow, FeatureValue};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Maps raw feature columns to the classifier's design matrix
///
/// Output layout: one-hot blocks for the categorical columns (in order),
/// followed by the numeric columns unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    imputer: Imputer,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl FeaturePreprocessor {
    /// Create a preprocessor around an already fitted imputer
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>, imputer: Imputer) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
            imputer,
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Learn the categories of every categorical column
    pub fn fit(&mut self, table: &RawTable) -> Result<&mut Self> {
        if !self.imputer.is_fitted() {
            return Err(LoanError::ModelNotFitted);
        }
        let start = Instant::now();

        let columns = self
            .categorical_columns
            .iter()
            .map(|name| {
                let column = table
                    .column(name)
                    .ok_or_else(|| LoanError::SchemaMismatch(format!("missing column '{}'", name)))?;
                Ok((name.clone(), self.imputer.impute_categorical(&column.coerce_text())))
            })
            .collect::<Result<Vec<_>>>()?;

        self.encoder.fit(&columns)?;
        self.is_fitted = true;

        debug!(
            encoded_width = self.encoder.n_features_out(),
            numeric = self.numeric_columns.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Fitted feature preprocessor"
        );
        Ok(self)
    }

    /// Transform every row of `table`
    pub fn transform(&self, table: &RawTable) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(LoanError::ModelNotFitted);
        }

        let n_rows = table.n_rows();
        let mut x = Array2::zeros((n_rows, self.n_features_out()));
        let blocks = self.encoder.block_offsets();

        for (index, name) in self.categorical_columns.iter().enumerate() {
            let column = table
                .column(name)
                .ok_or_else(|| LoanError::SchemaMismatch(format!("missing column '{}'", name)))?;
            let values = self.imputer.impute_categorical(&column.coerce_text());
            let (offset, width) = blocks[index];
            for (r, value) in values.iter().enumerate() {
                let mut row = x.row_mut(r);
                let out = row
                    .as_slice_mut()
                    .ok_or_else(|| LoanError::InferenceError("non-contiguous row".to_string()))?;
                self.encoder.encode_into(index, value, &mut out[offset..offset + width]);
            }
        }

        let numeric_offset = self.encoder.n_features_out();
        for (j, name) in self.numeric_columns.iter().enumerate() {
            let column = table
                .column(name)
                .ok_or_else(|| LoanError::SchemaMismatch(format!("missing column '{}'", name)))?;
            let values = self.imputer.impute_numeric(name, &column.coerce_numeric())?;
            for (r, v) in values.into_iter().enumerate() {
                x[[r, numeric_offset + j]] = v;
            }
        }

        Ok(x)
    }

    /// Transform a single validated feature row into a 1-row matrix
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(LoanError::ModelNotFitted);
        }

        let mut x = vec![0.0; self.n_features_out()];
        let blocks = self.encoder.block_offsets();

        for (index, name) in self.categorical_columns.iter().enumerate() {
            let value = match row.get(name) {
                Some(FeatureValue::Categorical(s)) => self.imputer.categorical_value(Some(s)),
                Some(other) => other.to_string(),
                None => return Err(LoanError::MissingColumn(name.clone())),
            };
            let (offset, width) = blocks[index];
            self.encoder.encode_into(index, &value, &mut x[offset..offset + width]);
        }

        let numeric_offset = self.encoder.n_features_out();
        for (j, name) in self.numeric_columns.iter().enumerate() {
            let value = match row.get(name) {
                Some(FeatureValue::Numeric(v)) => Some(*v),
                Some(other) => {
                    return Err(LoanError::InvalidValue {
                        column: name.clone(),
                        reason: format!("expected a number, got '{}'", other),
                    })
                }
                None => return Err(LoanError::MissingColumn(name.clone())),
            };
            x[numeric_offset + j] = self.imputer.numeric_value(name, value)?;
        }

        Ok(Array2::from_shape_vec((1, x.len()), x)?)
    }

    /// Width of the design matrix
    pub fn n_features_out(&self) -> usize {
        self.encoder.n_features_out() + self.numeric_columns.len()
    }

    /// Names of the design matrix columns
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names();
        names.extend(self.numeric_columns.iter().cloned());
        names
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn imputer(&self) -> &Imputer {
        &self.imputer
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
