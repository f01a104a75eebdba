//! Result card

use crate::cli::style::{
    bad, dim, line_box, line_box_bottom, line_box_empty, line_box_top, muted, ok,
};
use crate::inference::{Prediction, Verdict};
use colored::*;

const BAR_WIDTH: usize = 40;

/// Fixed-width bar with `p` of its cells filled; `p` is clamped to [0, 1]
pub fn probability_bar(p: f64, width: usize) -> String {
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (p * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Print the verdict, the bar and the probability
pub fn render_prediction(prediction: &Prediction) {
    let bar = probability_bar(prediction.probability, BAR_WIDTH);
    let (headline, bar) = match prediction.verdict() {
        Verdict::Approved => (ok("✓ Approved").bold(), ok(&bar)),
        Verdict::Rejected => (bad("✗ Rejected").bold(), bad(&bar)),
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box(&headline.to_string());
    line_box_empty();
    line_box(&format!("{} {}", bar, dim(&format!("{:>3.0}%", prediction.probability * 100.0))));
    line_box(&format!(
        "{} {}",
        muted("Probability of approval:"),
        format!("{:.2}", prediction.probability).white().bold()
    ));
    line_box_empty();
    line_box_bottom();
}
