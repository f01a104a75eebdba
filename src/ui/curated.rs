//! Typed widgets for the standard loan application fields

use super::Prompter;
use crate::error::Result;
use crate::inference::{FeatureRow, FormDefaults, RowBuilder};
use crate::schema::FeatureSchema;

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
pub const EDUCATION_LEVELS: [&str; 5] = ["High School", "Bachelor", "Master", "PhD", "Other"];
pub const MARITAL_STATUSES: [&str; 4] = ["Single", "Married", "Divorced", "Widowed"];

const AGE_RANGE: (i64, i64) = (18, 80);
const CREDIT_SCORE_RANGE: (i64, i64) = (300, 900);

/// Whole-number default, truncated and clamped into the slider range
fn slider_default(defaults: &FormDefaults, column: &str, range: (i64, i64), fallback: i64) -> i64 {
    defaults
        .number(column)
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
        .unwrap_or(fallback)
        .clamp(range.0, range.1)
}

/// Ask for the seven curated fields; other schema columns take their defaults
pub fn collect_curated(
    schema: &FeatureSchema,
    defaults: &FormDefaults,
    prompter: &mut dyn Prompter,
) -> Result<FeatureRow> {
    let mut row = RowBuilder::new(schema, defaults);

    let age = prompter.integer(
        "Age",
        AGE_RANGE.0,
        AGE_RANGE.1,
        slider_default(defaults, "age", AGE_RANGE, 30),
    )?;
    let income_default = defaults
        .number("income")
        .filter(|v| v.is_finite())
        .unwrap_or(30000.0)
        .max(0.0);
    let income = prompter.number("Income", Some(0.0), income_default)?;
    let credit_score = prompter.integer(
        "Credit score",
        CREDIT_SCORE_RANGE.0,
        CREDIT_SCORE_RANGE.1,
        slider_default(defaults, "credit_score", CREDIT_SCORE_RANGE, 650),
    )?;

    let gender_default = defaults
        .text("gender")
        .and_then(|g| GENDERS.iter().position(|&o| o == g))
        .unwrap_or(0);
    let gender = prompter.select("Gender", &GENDERS, gender_default)?;
    let occupation = prompter.text(
        "Occupation",
        &defaults.text("occupation").unwrap_or_else(|| "Employee".to_string()),
    )?;
    let education = prompter.select("Education level", &EDUCATION_LEVELS, 0)?;
    let marital = prompter.select("Marital status", &MARITAL_STATUSES, 0)?;

    row.set("age", age)
        .set("income", income)
        .set("credit_score", credit_score)
        .set("gender", GENDERS[gender.min(GENDERS.len() - 1)])
        .set("occupation", occupation)
        .set(
            "education_level",
            EDUCATION_LEVELS[education.min(EDUCATION_LEVELS.len() - 1)],
        )
        .set(
            "marital_status",
            MARITAL_STATUSES[marital.min(MARITAL_STATUSES.len() - 1)],
        );

    row.build()
}
