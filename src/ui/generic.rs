//! One input per schema column

use super::Prompter;
use crate::error::Result;
use crate::inference::{FeatureRow, FormDefaults, RowBuilder};
use crate::preprocessing::UNKNOWN_CATEGORY;
use crate::schema::FeatureSchema;

/// Ask for every schema column in schema order, prefilled with defaults
pub fn collect_generic(
    schema: &FeatureSchema,
    defaults: &FormDefaults,
    prompter: &mut dyn Prompter,
) -> Result<FeatureRow> {
    let mut row = RowBuilder::new(schema, defaults);

    for column in &schema.num {
        let default = defaults.number(column).unwrap_or(0.0);
        let value = prompter.number(column, None, default)?;
        row.set(column.as_str(), value);
    }
    for column in &schema.cat {
        let default = defaults
            .text(column)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        let value = prompter.text(column, &default)?;
        row.set(column.as_str(), value);
    }

    row.build()
}
