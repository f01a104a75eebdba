//! dialoguer-backed prompter

use super::{render_prediction, Prompter};
use crate::cli::style::accent;
use crate::error::Result;
use crate::inference::Prediction;
use dialoguer::console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

/// Theme shared by the launcher and the form
pub fn theme() -> ColorfulTheme {
    ColorfulTheme {
        active_item_prefix: style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().white().bold(),
        inactive_item_prefix: style("   ".to_string()).for_stderr(),
        inactive_item_style: Style::new().for_stderr().color256(245),
        prompt_prefix: style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

/// Reads form values from the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self { theme: theme() }
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(items)
            .default(default)
            .interact()?;
        Ok(index)
    }

    fn integer(&mut self, label: &str, min: i64, max: i64, default: i64) -> Result<i64> {
        let value = Input::<i64>::with_theme(&self.theme)
            .with_prompt(format!("{} ({}-{})", label, min, max))
            .default(default)
            .validate_with(move |v: &i64| -> std::result::Result<(), String> {
                if (min..=max).contains(v) {
                    Ok(())
                } else {
                    Err(format!("enter a whole number between {} and {}", min, max))
                }
            })
            .interact_text()?;
        Ok(value)
    }

    fn number(&mut self, label: &str, min: Option<f64>, default: f64) -> Result<f64> {
        let value = Input::<f64>::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .validate_with(move |v: &f64| -> std::result::Result<(), String> {
                match min {
                    _ if v.is_infinite() => Err("must be a finite number".to_string()),
                    Some(m) if *v < m => Err(format!("must be at least {}", m)),
                    _ => Ok(()),
                }
            })
            .interact_text()?;
        Ok(value)
    }

    fn text(&mut self, label: &str, default: &str) -> Result<String> {
        let value = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .default(default.to_string())
            .interact_text()?;
        Ok(value)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact()?;
        Ok(answer)
    }

    fn notice(&mut self, message: &str) {
        println!("  {} {}", accent("i"), message);
    }

    fn show_prediction(&mut self, prediction: &Prediction) {
        render_prediction(prediction);
    }
}
