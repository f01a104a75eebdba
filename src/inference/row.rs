//! Single-row feature input validated against the schema

use super::FormDefaults;
use crate::data::format_number;
use crate::error::{LoanError, Result};
use crate::preprocessing::ColumnKind;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A scalar feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FeatureValue::Numeric(_) => ColumnKind::Numeric,
            FeatureValue::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Categorical(s) => Some(s),
            FeatureValue::Numeric(_) => None,
        }
    }

    /// Convert to the declared kind of `column`
    ///
    /// Numbers become their text rendering; text must parse as a number.
    /// Numeric values must be finite; NaN stands for missing and is kept.
    pub fn coerce(self, column: &str, kind: ColumnKind) -> Result<Self> {
        match (self, kind) {
            (FeatureValue::Numeric(v), ColumnKind::Numeric) => finite(column, v),
            (v @ FeatureValue::Categorical(_), ColumnKind::Categorical) => Ok(v),
            (FeatureValue::Numeric(v), ColumnKind::Categorical) => {
                Ok(FeatureValue::Categorical(format_number(v)))
            }
            (FeatureValue::Categorical(s), ColumnKind::Numeric) => {
                let v = s.trim().parse::<f64>().map_err(|_| LoanError::InvalidValue {
                    column: column.to_string(),
                    reason: format!("'{}' is not a number", s),
                })?;
                finite(column, v)
            }
        }
    }
}

fn finite(column: &str, v: f64) -> Result<FeatureValue> {
    if v.is_infinite() {
        return Err(LoanError::InvalidValue {
            column: column.to_string(),
            reason: format!("{} is not a finite number", v),
        });
    }
    Ok(FeatureValue::Numeric(v))
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{}", format_number(*v)),
            FeatureValue::Categorical(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Numeric(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Numeric(v as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Categorical(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Categorical(s)
    }
}

/// One value per schema column, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    /// Build a row holding exactly the schema's columns
    ///
    /// Fails on a missing column, a column the schema does not declare, or a
    /// value that cannot be coerced to its column's kind.
    pub fn new(schema: &FeatureSchema, mut values: BTreeMap<String, FeatureValue>) -> Result<Self> {
        if let Some(extra) = values.keys().find(|k| schema.kind_of(k).is_none()) {
            return Err(LoanError::UnexpectedColumn(extra.clone()));
        }

        let mut columns = Vec::with_capacity(schema.len());
        let mut row = Vec::with_capacity(schema.len());
        for (name, kind) in schema
            .num
            .iter()
            .map(|n| (n, ColumnKind::Numeric))
            .chain(schema.cat.iter().map(|c| (c, ColumnKind::Categorical)))
        {
            let value = values
                .remove(name)
                .ok_or_else(|| LoanError::MissingColumn(name.clone()))?;
            columns.push(name.clone());
            row.push(value.coerce(name, kind)?);
        }

        Ok(Self { columns, values: row })
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns.iter().map(String::as_str).zip(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Collects submitted values and fills the remaining schema columns with defaults
pub struct RowBuilder<'a> {
    schema: &'a FeatureSchema,
    defaults: &'a FormDefaults,
    values: BTreeMap<String, FeatureValue>,
}

impl<'a> RowBuilder<'a> {
    pub fn new(schema: &'a FeatureSchema, defaults: &'a FormDefaults) -> Self {
        Self {
            schema,
            defaults,
            values: BTreeMap::new(),
        }
    }

    /// Record a submitted value
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FeatureValue>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Fill gaps from defaults, then validate into a [`FeatureRow`]
    pub fn build(self) -> Result<FeatureRow> {
        let mut values = self.values;
        for column in self.schema.columns() {
            if !values.contains_key(column) {
                let fallback = self.defaults.get_or_fallback(self.schema, column);
                debug!(column, value = %fallback, "Filled column from defaults");
                values.insert(column.to_string(), fallback);
            }
        }
        FeatureRow::new(self.schema, values)
    }
}
