//! Feature schema descriptor shared by the trainer and the predictor
//!
//! Persisted as `{"num": [...], "cat": [...], "target": "..."}`.

use crate::data::RawTable;
use crate::error::{LoanError, Result};
use crate::preprocessing::ColumnKind;
use crate::utils::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Ordered numeric and categorical feature columns plus the target name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Numeric columns, in dataset order
    pub num: Vec<String>,
    /// Categorical columns, in dataset order
    pub cat: Vec<String>,
    /// Name of the target column the model was trained on
    pub target: String,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicated or overlapping column names
    pub fn new(num: Vec<String>, cat: Vec<String>, target: impl Into<String>) -> Result<Self> {
        let schema = Self {
            num,
            cat,
            target: target.into(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Partition every non-target column of `table` by its storage kind
    pub fn from_table(table: &RawTable, target: &str) -> Result<Self> {
        let mut num = Vec::new();
        let mut cat = Vec::new();
        for column in table.columns().iter().filter(|c| c.name() != target) {
            match column.kind() {
                ColumnKind::Numeric => num.push(column.name().to_string()),
                ColumnKind::Categorical => cat.push(column.name().to_string()),
            }
        }
        Self::new(num, cat, target)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.num.iter().chain(&self.cat) {
            if !seen.insert(name.as_str()) {
                return Err(LoanError::SchemaMismatch(format!(
                    "column '{}' listed more than once",
                    name
                )));
            }
        }
        if seen.contains(self.target.as_str()) {
            return Err(LoanError::SchemaMismatch(format!(
                "target '{}' is also listed as a feature",
                self.target
            )));
        }
        Ok(())
    }

    /// All feature columns: numeric first, then categorical
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.num.iter().chain(&self.cat).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.num.len() + self.cat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared kind of a feature column
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.num.iter().any(|c| c == column) {
            Some(ColumnKind::Numeric)
        } else if self.cat.iter().any(|c| c == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Whether every name in `fields` is a feature column
    pub fn contains_all(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.kind_of(f).is_some())
    }

    /// Pretty JSON rendering of the descriptor
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the descriptor as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json()?.as_bytes())
    }

    /// Read a descriptor written by [`FeatureSchema::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let schema: Self = serde_json::from_str(&json)?;
        schema.validate()?;
        Ok(schema)
    }
}
