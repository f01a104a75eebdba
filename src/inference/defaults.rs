//! Form defaults derived from the training dataset

use super::FeatureValue;
use crate::data::{load_table, RawTable};
use crate::preprocessing::{median, ColumnKind, UNKNOWN_CATEGORY};
use crate::schema::FeatureSchema;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// One pre-filled value per schema column
///
/// Only used to populate form fields; never consulted by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDefaults {
    values: BTreeMap<String, FeatureValue>,
}

/// Most frequent value, ties broken by the smallest value
fn mode(values: impl Iterator<Item = String>) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(v, _)| v)
}

fn neutral(kind: ColumnKind) -> FeatureValue {
    match kind {
        ColumnKind::Numeric => FeatureValue::Numeric(0.0),
        ColumnKind::Categorical => FeatureValue::Categorical(UNKNOWN_CATEGORY.to_string()),
    }
}

impl FormDefaults {
    /// Neutral constants: `0.0` for numeric, `"Unknown"` for categorical
    pub fn fallback(schema: &FeatureSchema) -> Self {
        let values = schema
            .columns()
            .filter_map(|c| schema.kind_of(c).map(|k| (c.to_string(), neutral(k))))
            .collect();
        Self { values }
    }

    /// Median / most-frequent value of each schema column present in `table`
    pub fn from_table(schema: &FeatureSchema, table: &RawTable) -> Self {
        let mut defaults = Self::fallback(schema);

        for name in &schema.num {
            if let Some(column) = table.column(name) {
                let present: Vec<f64> = column.coerce_numeric().into_iter().flatten().collect();
                if let Some(m) = median(&present) {
                    defaults.values.insert(name.clone(), FeatureValue::Numeric(m));
                }
            }
        }

        for name in &schema.cat {
            if let Some(column) = table.column(name) {
                if let Some(m) = mode(column.coerce_text().into_iter().flatten()) {
                    defaults.values.insert(name.clone(), FeatureValue::Categorical(m));
                }
            }
        }

        defaults
    }

    /// Defaults from the dataset at `path`, or neutral constants if it cannot be read
    pub fn compute(schema: &FeatureSchema, path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "Dataset not found, using neutral form defaults");
            return Self::fallback(schema);
        }
        match load_table(path) {
            Ok(table) => Self::from_table(schema, &table),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read dataset, using neutral form defaults");
                Self::fallback(schema)
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.values.get(column)
    }

    /// Default for `column`, or the neutral constant of its declared kind
    pub fn get_or_fallback(&self, schema: &FeatureSchema, column: &str) -> FeatureValue {
        self.values.get(column).cloned().unwrap_or_else(|| {
            neutral(schema.kind_of(column).unwrap_or(ColumnKind::Categorical))
        })
    }

    /// Numeric default, if the column has one
    pub fn number(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(|v| match v {
            FeatureValue::Numeric(x) => Some(*x),
            FeatureValue::Categorical(s) => s.trim().parse().ok(),
        })
    }

    /// Text default, if the column has one
    pub fn text(&self, column: &str) -> Option<String> {
        self.values.get(column).map(|v| v.to_string())
    }
}
