//! L2-regularized logistic regression

use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge on the diagonal if the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    cholesky_solve_inner(a, b).or_else(|| {
        let mut a_reg = a.clone();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        for k in 0..n {
            a_reg[[k, k]] += ridge;
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve Ax = b by Gauss-Jordan elimination with partial pivoting (fallback)
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Augmented matrix [A | b]
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-12 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.column(n).to_owned())
}

/// Numerically stable logistic function
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Hyperparameters of [`LogisticRegression`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum number of Newton iterations
    pub max_iter: usize,
    /// Stop when the largest gradient component falls below this value
    pub tol: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-4,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(HeartError::ConfigError(format!(
                "classifier.c must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(HeartError::ConfigError(
                "classifier.max_iter must be at least 1".to_string(),
            ));
        }
        if !(self.tol > 0.0) {
            return Err(HeartError::ConfigError(format!(
                "classifier.tol must be positive, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

/// Binary logistic regression with an L2 penalty on the coefficients.
///
/// Minimizes `mean(log_loss) + ||w||² / (2·C·n)`; the intercept is not
/// penalized. Fitted by Newton's method on the full Hessian, which is cheap for
/// the handful of features this crate deals with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub config: LogisticRegressionConfig,
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Column means of the training design matrix
    pub feature_means: Option<Array1<f64>>,
    /// Newton iterations used by the last fit
    pub n_iter: usize,
    pub converged: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticRegressionConfig::default())
    }
}

impl LogisticRegression {
    pub fn new(config: LogisticRegressionConfig) -> Self {
        Self {
            config,
            coefficients: None,
            intercept: None,
            feature_means: None,
            n_iter: 0,
            converged: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit on a design matrix and 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(HeartError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(HeartError::TrainingError("no training samples".to_string()));
        }
        if let Some(bad) = y.iter().find(|&&v| v > 1) {
            return Err(HeartError::TrainingError(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }

        let y = y.mapv(f64::from);
        let n = n_samples as f64;
        let l2 = 1.0 / (self.config.c * n);
        let dim = n_features + 1;

        // Design matrix with a trailing intercept column
        let mut xa = Array2::<f64>::ones((n_samples, dim));
        xa.slice_mut(ndarray::s![.., ..n_features]).assign(x);

        let objective = |w: &Array1<f64>| -> f64 {
            let z = xa.dot(w);
            let loss: f64 = z
                .iter()
                .zip(y.iter())
                .map(|(&zi, &yi)| softplus(zi) - yi * zi)
                .sum::<f64>()
                / n;
            let penalty: f64 = w.iter().take(n_features).map(|v| v * v).sum();
            loss + 0.5 * l2 * penalty
        };

        let mut w = Array1::<f64>::zeros(dim);
        let mut current = objective(&w);
        self.converged = false;
        self.n_iter = 0;

        for iter in 0..self.config.max_iter {
            let p = xa.dot(&w).mapv(sigmoid);

            let mut grad = xa.t().dot(&(&p - &y)) / n;
            for j in 0..n_features {
                grad[j] += l2 * w[j];
            }

            let grad_max = grad.iter().fold(0.0f64, |m, g| m.max(g.abs()));
            if grad_max <= self.config.tol {
                self.converged = true;
                break;
            }

            // Hessian: X^T diag(p(1-p)) X / n + l2 * I (intercept excluded)
            let weights = p.mapv(|pi| pi * (1.0 - pi));
            let weighted = &xa * &weights.view().insert_axis(Axis(1));
            let mut hessian = xa.t().dot(&weighted) / n;
            for j in 0..n_features {
                hessian[[j, j]] += l2;
            }

            let step = cholesky_solve(&hessian, &grad)
                .or_else(|| gauss_jordan_solve(&hessian, &grad))
                .ok_or_else(|| {
                    HeartError::ComputationError("singular Hessian in Newton step".to_string())
                })?;

            // Backtracking line search on the objective
            let mut t = 1.0;
            let mut next = &w - &step;
            let mut next_value = objective(&next);
            let slack = 1e-12 * current.abs().max(1.0);
            while next_value > current + slack && t > 1e-10 {
                t *= 0.5;
                next = &w - &(t * &step);
                next_value = objective(&next);
            }

            w = next;
            current = next_value;
            self.n_iter = iter + 1;
        }

        if !self.converged {
            warn!(
                max_iter = self.config.max_iter,
                "Logistic regression did not converge; consider raising classifier.max_iter"
            );
        }
        debug!(n_iter = self.n_iter, objective = current, "Fitted logistic regression");

        self.coefficients = Some(w.slice(ndarray::s![..n_features]).to_owned());
        self.intercept = Some(w[n_features]);
        self.feature_means = x.mean_axis(Axis(0));

        Ok(self)
    }

    fn params(&self) -> Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) => Ok((coefficients, intercept)),
            _ => Err(HeartError::ModelNotFitted),
        }
    }

    fn check_width(&self, width: usize) -> Result<()> {
        let (coefficients, _) = self.params()?;
        if coefficients.len() != width {
            return Err(HeartError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", width),
            });
        }
        Ok(())
    }

    /// Log-odds for each row
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width(x.ncols())?;
        let (coefficients, intercept) = self.params()?;
        Ok(x.dot(coefficients) + intercept)
    }

    /// Probability of the positive class for each row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Predict class labels; 1 when P(1) > 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| u8::from(p > 0.5)))
    }

    /// Per-column log-odds contributions of one row relative to the training means
    pub fn contributions(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_width(row.len())?;
        let (coefficients, _) = self.params()?;
        let means = self.feature_means.as_ref().ok_or(HeartError::ModelNotFitted)?;
        Ok(coefficients * &(&row - means))
    }
}
