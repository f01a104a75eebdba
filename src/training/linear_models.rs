//! Linear model implementations

use super::ClassWeight;
use crate::error::{LoanError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge on the diagonal if the matrix is not PD.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    cholesky_solve_inner(a, b).or_else(|| {
        let mut a_reg = a.clone();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        for k in 0..n {
            a_reg[[k, k]] += ridge.max(1e-12);
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Numerically stable logistic function
fn sigmoid(v: f64) -> f64 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

/// Per-row loss weights
fn sample_weights(y: &Array1<f64>, class_weight: ClassWeight) -> Array1<f64> {
    match class_weight {
        ClassWeight::Uniform => Array1::ones(y.len()),
        ClassWeight::Balanced => {
            let n = y.len() as f64;
            let positives = y.iter().filter(|&&v| v > 0.5).count() as f64;
            let negatives = n - positives;
            y.mapv(|v| {
                if v > 0.5 {
                    n / (2.0 * positives)
                } else {
                    n / (2.0 * negatives)
                }
            })
        }
    }
}

/// L2-regularized logistic regression for binary classification
///
/// Minimizes `C * Σ wᵢ·logloss(xᵢ, yᵢ) + ½‖β‖²` by Newton's method on
/// standardized columns. After fitting, the coefficients are expressed over
/// the raw (unstandardized) features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients over raw features
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularization strength
    pub c: f64,
    /// Loss weighting per class
    pub class_weight: ClassWeight,
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Convergence tolerance on the largest step component
    pub tol: f64,
    /// Iterations used by the last fit
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            class_weight: ClassWeight::Uniform,
            max_iter: 100,
            tol: 1e-8,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit the model; `y` must hold both 0 and 1
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(LoanError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(LoanError::TrainingError("labels must be 0 or 1".to_string()));
        }
        let positives = y.iter().filter(|&&v| v == 1.0).count();
        if positives == 0 || positives == n_samples {
            return Err(LoanError::TrainingError(
                "training split must contain both classes".to_string(),
            ));
        }

        // Standardize columns; constant columns keep scale 1
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| LoanError::TrainingError("empty training matrix".to_string()))?;
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });

        // Design matrix with a trailing intercept column
        let mut z = Array2::<f64>::ones((n_samples, n_features + 1));
        for j in 0..n_features {
            let col = x.column(j).mapv(|v| (v - mean[j]) / scale[j]);
            z.column_mut(j).assign(&col);
        }

        let weights = sample_weights(y, self.class_weight);
        let c = self.c;
        let mut beta = Array1::<f64>::zeros(n_features + 1);
        let mut converged = false;
        self.n_iter = 0;

        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;

            let eta = z.dot(&beta);
            let p = eta.mapv(sigmoid);

            // Gradient of the objective
            let residual = &weights * &(&p - y) * c;
            let mut grad = z.t().dot(&residual);
            for j in 0..n_features {
                grad[j] += beta[j];
            }

            // Hessian of the objective
            let curvature = &weights * &p.mapv(|pi| pi * (1.0 - pi)) * c;
            let zw = &z * &curvature.view().insert_axis(Axis(1));
            let mut hessian = z.t().dot(&zw);
            for j in 0..n_features {
                hessian[[j, j]] += 1.0;
            }

            let step = cholesky_solve(&hessian, &grad).ok_or_else(|| {
                LoanError::TrainingError("Newton system is singular".to_string())
            })?;
            beta = beta - &step;

            let max_step = step.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if !max_step.is_finite() {
                return Err(LoanError::TrainingError("solver diverged".to_string()));
            }
            if max_step < self.tol {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations = self.n_iter, "Logistic regression converged");
        } else {
            warn!(
                iterations = self.n_iter,
                "Logistic regression did not converge, using last iterate"
            );
        }

        // Fold standardization back into raw-feature coefficients
        let coefficients = Array1::from_shape_fn(n_features, |j| beta[j] / scale[j]);
        let intercept = beta[n_features]
            - (0..n_features)
                .map(|j| beta[j] * mean[j] / scale[j])
                .sum::<f64>();

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.is_fitted = true;

        Ok(self)
    }

    /// Predict positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = match (&self.coefficients, self.intercept) {
            (Some(c), Some(i)) if self.is_fitted => (c, i),
            _ => return Err(LoanError::ModelNotFitted),
        };
        if x.ncols() != coefficients.len() {
            return Err(LoanError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let linear = x.dot(coefficients) + intercept;
        Ok(linear.mapv(sigmoid))
    }

    /// Predict class labels at the 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 20000.0],
            [2.0, 22000.0],
            [3.0, 25000.0],
            [4.0, 27000.0],
            [6.0, 60000.0],
            [7.0, 65000.0],
            [8.0, 70000.0],
            [9.0, 72000.0]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_fit_predict_on_unscaled_features() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted);
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(proba[7] > proba[0]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = separable();
        let mut a = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        let mut b = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercept, b.intercept);
    }

    #[test]
    fn test_balanced_weights() {
        let y = array![1.0, 0.0, 0.0, 0.0];
        let w = sample_weights(&y, ClassWeight::Balanced);
        assert_eq!(w.to_vec(), vec![2.0, 4.0 / 6.0, 4.0 / 6.0, 4.0 / 6.0]);
        // Both classes carry equal total weight
        assert!((w[0] - w.slice(ndarray::s![1..]).sum()).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weighting_shifts_toward_minority() {
        let x = array![[0.0], [0.1], [0.2], [0.3], [0.4], [0.5], [0.6], [1.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];

        let mut plain = LogisticRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut balanced = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        balanced.fit(&x, &y).unwrap();

        let probe = array![[1.0]];
        let p_plain = plain.predict_proba(&probe).unwrap()[0];
        let p_balanced = balanced.predict_proba(&probe).unwrap()[0];
        assert!(p_balanced > p_plain);
    }

    #[test]
    fn test_constant_column_is_harmless() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        assert!(model.predict_proba(&x).unwrap().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];
        let mut model = LogisticRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(LoanError::TrainingError(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict_proba(&array![[1.0]]),
            Err(LoanError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_wrong_width() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        assert!(matches!(
            model.predict_proba(&array![[1.0]]),
            Err(LoanError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        let back = a.dot(&x);
        assert!((back[0] - 2.0).abs() < 1e-10);
        assert!((back[1] - 1.0).abs() < 1e-10);
    }
}
