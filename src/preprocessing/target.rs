//! Target column detection and label normalization

use crate::data::RawColumn;
use crate::error::{LoanError, Result};
use std::collections::HashSet;
use tracing::info;

/// Column names recognized as the approval outcome (compared lowercased)
pub const TARGET_ALIASES: [&str; 4] = ["loan_status", "loanstatus", "target", "label"];

/// Maximum number of distinct values quoted in a non-binary target error
const MAX_REPORTED_VALUES: usize = 20;

/// How a missing label is quoted in a non-binary target error
const MISSING_LABEL: &str = "nan";

/// Find the first column whose lowercased name is a target alias
pub fn detect_target<S: AsRef<str>>(columns: &[S]) -> Result<String> {
    columns
        .iter()
        .map(|c| c.as_ref())
        .find(|c| TARGET_ALIASES.contains(&c.to_lowercase().as_str()))
        .map(str::to_string)
        .ok_or_else(|| LoanError::TargetNotFound {
            expected: TARGET_ALIASES.join(", "),
        })
}

/// Map a raw label to 0/1, or `None` when it is outside the vocabulary
pub fn normalize_label(raw: &str) -> Option<u8> {
    match raw.trim().to_lowercase().as_str() {
        "y" | "yes" | "approved" | "approve" | "1" | "true" => Some(1),
        "n" | "no" | "rejected" | "reject" | "denied" | "declined" | "0" | "false" => Some(0),
        _ => None,
    }
}

/// Binarized target: labels for the rows that survived normalization
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTarget {
    /// 0/1 label per kept row
    pub labels: Vec<u8>,
    /// Original row index of each kept row
    pub kept_rows: Vec<usize>,
    /// Rows dropped because their label had no mapping
    pub dropped_rows: usize,
}

impl BinaryTarget {
    /// Row counts per class, `[negatives, positives]`
    pub fn class_counts(&self) -> [usize; 2] {
        let positives = self.labels.iter().filter(|&&l| l == 1).count();
        [self.labels.len() - positives, positives]
    }
}

/// Normalize a target column, dropping rows with unmapped labels
///
/// Fails when fewer than two classes survive.
pub fn binarize(column: &RawColumn) -> Result<BinaryTarget> {
    let mut labels = Vec::with_capacity(column.len());
    let mut kept_rows = Vec::with_capacity(column.len());
    // Distinct normalized values in order of first appearance
    let mut seen = Vec::new();
    let mut distinct = HashSet::new();

    for i in 0..column.len() {
        let text = column.text_at(i);
        let normalized = text
            .as_deref()
            .map_or_else(|| MISSING_LABEL.to_string(), |t| t.trim().to_lowercase());
        if distinct.insert(normalized.clone()) {
            seen.push(normalized);
        }
        if let Some(label) = text.as_deref().and_then(normalize_label) {
            labels.push(label);
            kept_rows.push(i);
        }
    }

    let target = BinaryTarget {
        dropped_rows: column.len() - kept_rows.len(),
        labels,
        kept_rows,
    };

    let [negatives, positives] = target.class_counts();
    if negatives == 0 || positives == 0 {
        seen.truncate(MAX_REPORTED_VALUES);
        seen.sort();
        return Err(LoanError::NonBinaryTarget { seen });
    }

    if target.dropped_rows > 0 {
        info!(
            column = column.name(),
            dropped = target.dropped_rows,
            "Dropped rows with labels outside the approval vocabulary"
        );
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text_column(values: &[Option<&str>]) -> RawColumn {
        RawColumn::categorical(
            "loan_status",
            values.iter().map(|v| v.map(str::to_string)).collect(),
        )
    }

    #[test]
    fn test_detect_target_case_insensitive() {
        let cols = ["age", "Loan_Status", "income"];
        assert_eq!(detect_target(&cols).unwrap(), "Loan_Status");
    }

    #[test]
    fn test_detect_target_first_match_wins() {
        let cols = ["Label", "age", "target"];
        assert_eq!(detect_target(&cols).unwrap(), "Label");
    }

    #[test]
    fn test_detect_target_missing() {
        let cols = ["age", "income"];
        let err = detect_target(&cols).unwrap_err();
        assert!(matches!(err, LoanError::TargetNotFound { .. }));
        assert!(err.to_string().contains("loan_status"));
    }

    #[test]
    fn test_normalize_vocabulary() {
        assert_eq!(normalize_label("  Approved "), Some(1));
        assert_eq!(normalize_label("YES"), Some(1));
        assert_eq!(normalize_label("Denied"), Some(0));
        assert_eq!(normalize_label("false"), Some(0));
        assert_eq!(normalize_label("pending"), None);
    }

    #[test]
    fn test_binarize_drops_unmapped_rows() {
        let col = text_column(&[
            Some("Approved"),
            Some("pending"),
            None,
            Some("rejected"),
            Some("Y"),
        ]);
        let target = binarize(&col).unwrap();
        assert_eq!(target.labels, vec![1, 0, 1]);
        assert_eq!(target.kept_rows, vec![0, 3, 4]);
        assert_eq!(target.dropped_rows, 2);
        assert_eq!(target.class_counts(), [1, 2]);
    }

    #[test]
    fn test_binarize_single_surviving_class_fails() {
        let col = text_column(&[Some("Approved"), Some("pending"), Some("canceled")]);
        match binarize(&col) {
            Err(LoanError::NonBinaryTarget { seen }) => {
                assert_eq!(seen, vec!["approved", "canceled", "pending"]);
            }
            other => panic!("expected NonBinaryTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_seen_values_first_twenty_then_sorted() {
        // 25 distinct unmapped labels, appearing in descending order, plus a missing one
        let mut values: Vec<Option<String>> =
            (0..25).rev().map(|i| Some(format!("v{:02}", i))).collect();
        values.insert(3, None);
        values.push(Some("Yes".into()));
        let col = RawColumn::categorical("loan_status", values);

        match binarize(&col) {
            Err(LoanError::NonBinaryTarget { seen }) => {
                let mut expected: Vec<String> =
                    (6..25).map(|i| format!("v{:02}", i)).collect();
                expected.push("nan".into());
                expected.sort();
                assert_eq!(seen, expected);
            }
            other => panic!("expected NonBinaryTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_binarize_numeric_column() {
        let col = RawColumn::numeric("target", vec![Some(1.0), Some(0.0), None, Some(1.0)]);
        let target = binarize(&col).unwrap();
        assert_eq!(target.labels, vec![1, 0, 1]);
        assert_eq!(target.dropped_rows, 1);
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(bits in prop::collection::vec(0u8..=1, 2..60)) {
            prop_assume!(bits.contains(&0) && bits.contains(&1));
            let col = RawColumn::categorical(
                "label",
                bits.iter().map(|b| Some(b.to_string())).collect(),
            );
            let first = binarize(&col).unwrap();
            prop_assert_eq!(&first.labels, &bits);

            let again = RawColumn::numeric(
                "label",
                first.labels.iter().map(|&b| Some(b as f64)).collect(),
            );
            let second = binarize(&again).unwrap();
            prop_assert_eq!(second.labels, first.labels);
            prop_assert_eq!(second.dropped_rows, 0);
        }
    }
}
