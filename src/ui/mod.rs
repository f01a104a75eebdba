//! Interactive prediction form
//!
//! The form is driven through the [`Prompter`] trait so the same session
//! logic runs against a real terminal ([`TerminalPrompter`]) or a scripted
//! input source in tests.

mod curated;
mod generic;
mod render;
mod terminal;

pub use curated::{collect_curated, EDUCATION_LEVELS, GENDERS, MARITAL_STATUSES};
pub use generic::collect_generic;
pub use render::{probability_bar, render_prediction};
pub use terminal::{theme, TerminalPrompter};

use crate::error::{LoanError, Result};
use crate::inference::{FeatureRow, FormDefaults, InferenceEngine, Prediction};
use crate::schema::FeatureSchema;
use std::fmt;
use tracing::debug;

/// Columns a schema must contain for the curated form to be offered
pub const CURATED_FIELDS: [&str; 7] = [
    "age",
    "gender",
    "occupation",
    "education_level",
    "marital_status",
    "income",
    "credit_score",
];

/// How the form presents its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Typed widgets for the well-known loan fields
    Curated,
    /// One untyped input per schema column
    Generic,
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormMode::Curated => write!(f, "Form"),
            FormMode::Generic => write!(f, "Typing"),
        }
    }
}

/// Modes the schema supports, preferred first
pub fn available_modes(schema: &FeatureSchema) -> Vec<FormMode> {
    if schema.contains_all(&CURATED_FIELDS) {
        vec![FormMode::Curated, FormMode::Generic]
    } else {
        vec![FormMode::Generic]
    }
}

/// Input and output surface of the form
pub trait Prompter {
    /// Pick one of `items`, returning its index
    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize>;

    /// Integer within `[min, max]`
    fn integer(&mut self, label: &str, min: i64, max: i64, default: i64) -> Result<i64>;

    /// Number, optionally bounded below
    fn number(&mut self, label: &str, min: Option<f64>, default: f64) -> Result<f64>;

    fn text(&mut self, label: &str, default: &str) -> Result<String>;

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;

    /// Informational message
    fn notice(&mut self, message: &str);

    /// Present a scored submission
    fn show_prediction(&mut self, prediction: &Prediction);
}

/// Serving state machine: `Idle -> Computing -> DisplayResult -> Idle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServingState {
    Idle,
    Computing,
    DisplayResult(Prediction),
}

/// One interactive serving session over a loaded engine
pub struct ServingSession<'a> {
    engine: &'a InferenceEngine,
    defaults: &'a FormDefaults,
    state: ServingState,
}

impl<'a> ServingSession<'a> {
    pub fn new(engine: &'a InferenceEngine, defaults: &'a FormDefaults) -> Self {
        Self {
            engine,
            defaults,
            state: ServingState::Idle,
        }
    }

    pub fn state(&self) -> ServingState {
        self.state
    }

    pub fn modes(&self) -> Vec<FormMode> {
        available_modes(self.engine.schema())
    }

    /// Ask which form to use; explains when only the generic form applies
    pub fn choose_mode(&self, prompter: &mut dyn Prompter) -> Result<FormMode> {
        let modes = self.modes();
        if modes.len() == 1 {
            prompter.notice(
                "The dataset does not match the standard loan form; using the typing form.",
            );
            return Ok(FormMode::Generic);
        }
        let labels: Vec<String> = modes.iter().map(|m| m.to_string()).collect();
        let items: Vec<&str> = labels.iter().map(String::as_str).collect();
        let index = prompter.select("Input mode", &items, 0)?;
        Ok(modes.get(index).copied().unwrap_or(FormMode::Generic))
    }

    /// Collect one row in `mode`
    pub fn collect(&self, mode: FormMode, prompter: &mut dyn Prompter) -> Result<FeatureRow> {
        let schema = self.engine.schema();
        match mode {
            FormMode::Curated => collect_curated(schema, self.defaults, prompter),
            FormMode::Generic => collect_generic(schema, self.defaults, prompter),
        }
    }

    /// Collect, score and present one submission
    pub fn submit(&mut self, mode: FormMode, prompter: &mut dyn Prompter) -> Result<Prediction> {
        if self.state != ServingState::Idle {
            return Err(LoanError::InferenceError(
                "a submission is already in progress".to_string(),
            ));
        }

        let row = self.collect(mode, prompter)?;
        self.state = ServingState::Computing;
        let prediction = match self.engine.predict(&row) {
            Ok(p) => p,
            Err(e) => {
                self.state = ServingState::Idle;
                return Err(e);
            }
        };

        self.state = ServingState::DisplayResult(prediction);
        prompter.show_prediction(&prediction);
        debug!(mode = %mode, probability = prediction.probability, "Displayed result");
        Ok(prediction)
    }

    /// Leave the result screen
    pub fn acknowledge(&mut self) {
        self.state = ServingState::Idle;
    }

    /// Serve submissions until the user declines another one
    ///
    /// Invalid input and failed scoring are reported and the session continues.
    pub fn run(&mut self, prompter: &mut dyn Prompter) -> Result<usize> {
        let mode = self.choose_mode(prompter)?;
        let mut served = 0;

        loop {
            match self.submit(mode, prompter) {
                Ok(_) => served += 1,
                Err(e @ (LoanError::InvalidValue { .. }
                | LoanError::MissingColumn(_)
                | LoanError::UnexpectedColumn(_)
                | LoanError::InferenceError(_))) => {
                    prompter.notice(&e.to_string());
                }
                Err(e) => return Err(e),
            }
            self.acknowledge();

            if !prompter.confirm("Score another application?", true)? {
                break;
            }
        }

        Ok(served)
    }
}
