//! Stratified train/test split

use crate::error::{LoanError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of held-out rows per class, proportional to class size
///
/// Uses largest-remainder rounding so the counts sum to the global test size,
/// then keeps at least one row of every class on each side.
fn allocate(counts: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| n_test as f64 * c as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    let mut remaining = n_test.saturating_sub(alloc.iter().sum());
    for &k in order.iter().cycle().take(counts.len() * 2) {
        if remaining == 0 {
            break;
        }
        alloc[k] += 1;
        remaining -= 1;
    }

    alloc
        .iter()
        .zip(counts)
        .map(|(&a, &c)| a.clamp(1, c - 1))
        .collect()
}

/// Split row indices into train and test preserving class proportions
///
/// `labels` holds one class id per row. Every class must have at least two
/// rows. The result depends only on `labels`, `test_size` and `seed`.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(LoanError::ConfigError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    if by_class.len() < 2 {
        return Err(LoanError::DataError(
            "stratified split needs at least two classes".to_string(),
        ));
    }
    if let Some((label, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(LoanError::DataError(format!(
            "class {} has {} row(s); at least 2 are required to stratify",
            label,
            rows.len()
        )));
    }

    let n = labels.len();
    let n_test = ((n as f64 * test_size) - 1e-9).ceil().max(1.0) as usize;
    let counts: Vec<usize> = by_class.values().map(Vec::len).collect();
    let per_class = allocate(&counts, n_test);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n);
    let mut test = Vec::with_capacity(n_test);

    for (rows, take) in by_class.values_mut().zip(per_class) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(neg: usize, pos: usize) -> Vec<u8> {
        let mut l = vec![0u8; neg];
        l.extend(std::iter::repeat(1u8).take(pos));
        l
    }

    #[test]
    fn test_sizes_and_proportions() {
        let y = labels(70, 30);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 6);
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels(40, 25);
        let a = stratified_split(&y, 0.25, 7).unwrap();
        let b = stratified_split(&y, 0.25, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_split() {
        let y = labels(40, 25);
        let a = stratified_split(&y, 0.25, 1).unwrap();
        let b = stratified_split(&y, 0.25, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_small_class_on_both_sides() {
        let y = labels(48, 2);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.iter().filter(|&&i| y[i] == 1).count(), 1);
        assert_eq!(split.train.iter().filter(|&&i| y[i] == 1).count(), 1);
    }

    #[test]
    fn test_singleton_class_rejected() {
        let y = labels(10, 1);
        assert!(matches!(
            stratified_split(&y, 0.2, 42),
            Err(LoanError::DataError(_))
        ));
    }

    #[test]
    fn test_single_class_rejected() {
        assert!(stratified_split(&labels(10, 0), 0.2, 42).is_err());
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(matches!(
            stratified_split(&labels(5, 5), 1.0, 42),
            Err(LoanError::ConfigError(_))
        ));
    }

    #[test]
    fn test_allocate_largest_remainder() {
        // 3 test rows over classes of 5 and 5: remainders tie, lower class wins
        assert_eq!(allocate(&[5, 5], 3), vec![2, 1]);
        assert_eq!(allocate(&[90, 10], 10), vec![9, 1]);
    }

    proptest! {
        #[test]
        fn prop_partition_is_exact(neg in 2usize..60, pos in 2usize..60, seed in any::<u64>()) {
            let y = labels(neg, pos);
            let split = stratified_split(&y, 0.2, seed).unwrap();
            let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..neg + pos).collect::<Vec<_>>());
            for class in [0u8, 1u8] {
                prop_assert!(split.test.iter().any(|&i| y[i] == class));
                prop_assert!(split.train.iter().any(|&i| y[i] == class));
            }
        }
    }
}
