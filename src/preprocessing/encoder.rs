//! One-hot encoding for categorical columns

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder; categories unseen during fit encode to all zeros
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    /// Sorted categories per column
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the sorted category set of each column
    pub fn fit(&mut self, columns: &[(String, Vec<String>)]) -> Result<&mut Self> {
        self.columns = columns.iter().map(|(name, _)| name.clone()).collect();
        self.categories = columns
            .iter()
            .map(|(_, values)| {
                values
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Categories learned for a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.column_index(column).map(|i| self.categories[i].as_slice())
    }

    /// Total width of the encoded block
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    /// Output feature names as `column_category`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |cat| format!("{}_{}", col, cat)))
            .collect()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Write the encoding of `value` for the column at `index` into `out`
    ///
    /// `out` must be exactly as wide as that column's category list.
    pub(crate) fn encode_into(&self, index: usize, value: &str, out: &mut [f64]) {
        out.iter_mut().for_each(|v| *v = 0.0);
        if let Ok(pos) = self.categories[index].binary_search_by(|c| c.as_str().cmp(value)) {
            out[pos] = 1.0;
        }
    }

    /// Encode a single value of one column
    pub fn encode(&self, column: &str, value: &str) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(LoanError::ModelNotFitted);
        }
        let index = self
            .column_index(column)
            .ok_or_else(|| LoanError::SchemaMismatch(format!("encoder has no column '{}'", column)))?;
        let mut out = vec![0.0; self.categories[index].len()];
        self.encode_into(index, value, &mut out);
        Ok(out)
    }

    /// Recover the category of an encoded block, `None` for the all-zero block
    pub fn decode(&self, column: &str, encoded: &[f64]) -> Option<&str> {
        let index = self.column_index(column)?;
        encoded
            .iter()
            .position(|&v| v == 1.0)
            .and_then(|pos| self.categories[index].get(pos))
            .map(String::as_str)
    }

    /// Offsets of each column's block inside the encoded row
    pub(crate) fn block_offsets(&self) -> Vec<(usize, usize)> {
        let mut offset = 0;
        self.categories
            .iter()
            .map(|cats| {
                let block = (offset, cats.len());
                offset += cats.len();
                block
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> OneHotEncoder {
        let mut encoder = OneHotEncoder::new();
        encoder
            .fit(&[
                (
                    "gender".to_string(),
                    vec!["Male".into(), "Female".into(), "Male".into(), "Other".into()],
                ),
                ("city".to_string(), vec!["NYC".into(), "LA".into()]),
            ])
            .unwrap();
        encoder
    }

    #[test]
    fn test_categories_sorted() {
        let encoder = fitted();
        assert_eq!(encoder.categories("gender").unwrap(), ["Female", "Male", "Other"]);
        assert_eq!(encoder.n_features_out(), 5);
        assert_eq!(encoder.feature_names()[3], "city_LA");
    }

    #[test]
    fn test_seen_category_round_trip() {
        let encoder = fitted();
        for category in ["Female", "Male", "Other"] {
            let encoded = encoder.encode("gender", category).unwrap();
            assert_eq!(encoded.iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(encoder.decode("gender", &encoded), Some(category));
        }
    }

    #[test]
    fn test_unseen_category_is_all_zero() {
        let encoder = fitted();
        let encoded = encoder.encode("gender", "Robot").unwrap();
        assert_eq!(encoded, vec![0.0, 0.0, 0.0]);
        assert_eq!(encoder.decode("gender", &encoded), None);
    }

    #[test]
    fn test_unknown_column() {
        let encoder = fitted();
        assert!(matches!(
            encoder.encode("planet", "Mars"),
            Err(LoanError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_block_offsets() {
        assert_eq!(fitted().block_offsets(), vec![(0, 3), (3, 2)]);
    }
}
