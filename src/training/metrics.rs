//! Evaluation metrics for the binary classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confusion counts for the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r > 0.0 {
        2.0 * p * r / (p + r)
    } else {
        0.0
    }
}

/// Area under the ROC curve via the Mann-Whitney statistic
///
/// Tied scores receive their average rank. Returns `None` when `y_true`
/// holds a single class.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut pos_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; ties share the mean of ranks i+1..=j+1
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            if y_true[k] == 1 {
                pos_rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos as f64 * n_neg as f64))
}

/// Headline metrics on the held-out split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// F1 of the positive class
    pub f1_score: f64,
    /// `None` when the hold-out contains a single class
    pub auc_roc: Option<f64>,
    pub confusion: ConfusionCounts,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub training_time_secs: f64,
}

impl ModelMetrics {
    /// Compute metrics from true labels, hard predictions and probabilities
    pub fn compute(y_true: &[u8], y_pred: &[u8], y_prob: &[f64]) -> Self {
        let confusion = ConfusionCounts::from_labels(y_true, y_pred);
        let precision = ratio(confusion.tp, confusion.tp + confusion.fp);
        let recall = ratio(confusion.tp, confusion.tp + confusion.fn_);

        Self {
            accuracy: ratio(confusion.tp + confusion.tn, confusion.total()),
            precision,
            recall,
            f1_score: harmonic(precision, recall),
            auc_roc: roc_auc(y_true, y_prob),
            confusion,
            n_train: 0,
            n_test: y_true.len(),
            n_features: 0,
            training_time_secs: 0.0,
        }
    }

    /// One-line summary, e.g. `ACC 0.850 | F1 0.812 | ROC-AUC 0.901`
    pub fn summary(&self) -> String {
        let auc = self
            .auc_roc
            .map(|v| format!("{:.3}", v))
            .unwrap_or_else(|| "nan".to_string());
        format!(
            "ACC {:.3} | F1 {:.3} | ROC-AUC {}",
            self.accuracy, self.f1_score, auc
        )
    }
}

/// Precision, recall, F1 and support of one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class report with macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Scores for label 0 then label 1
    pub classes: [ClassScores; 2],
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn compute(y_true: &[u8], y_pred: &[u8]) -> Self {
        let c = ConfusionCounts::from_labels(y_true, y_pred);

        let scores = |tp: usize, fp: usize, fn_: usize| {
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            ClassScores {
                precision,
                recall,
                f1: harmonic(precision, recall),
                support: tp + fn_,
            }
        };
        // For class 0 the roles of positives and negatives swap
        let classes = [scores(c.tn, c.fn_, c.fp), scores(c.tp, c.fp, c.fn_)];

        let total = c.total();
        let avg = |weight: &dyn Fn(&ClassScores) -> f64| {
            let w: Vec<f64> = classes.iter().map(weight).collect();
            let sum: f64 = w.iter().sum();
            let mean = |f: fn(&ClassScores) -> f64| {
                if sum > 0.0 {
                    classes.iter().zip(&w).map(|(s, wi)| f(s) * wi).sum::<f64>() / sum
                } else {
                    0.0
                }
            };
            ClassScores {
                precision: mean(|s| s.precision),
                recall: mean(|s| s.recall),
                f1: mean(|s| s.f1),
                support: total,
            }
        };

        let macro_avg = avg(&|_| 1.0);
        let weighted_avg = avg(&|s| s.support as f64);

        Self {
            classes,
            accuracy: ratio(c.tp + c.tn, total),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores| {
            writeln!(
                f,
                "{:>12} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                name, s.precision, s.recall, s.f1, s.support
            )
        };

        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        row(f, "0", &self.classes[0])?;
        row(f, "1", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.3} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
