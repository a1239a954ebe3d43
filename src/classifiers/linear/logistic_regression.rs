use crate::classifiers::classifier::Classifier;
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::error::{DowntimeError, Result};
use crate::utils::math::{dot, sigmoid, softplus, solve_linear_system};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ARMIJO: f64 = 1e-4;
const MAX_HALVINGS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    /// Inverse L2 regularization strength; smaller is stronger.
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-8,
            fit_intercept: true,
        }
    }
}

/// Binary L2-regularized logistic regression fitted with damped Newton steps.
///
/// Minimizes `sum_i w_i * logloss(y_i, x_i . beta + b) + ||beta||^2 / (2C)`;
/// the intercept is not penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: LogisticRegressionParams,
    coefficients: Vec<f64>,
    intercept: f64,
    n_iter: usize,
    converged: bool,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Self {
        Self {
            params,
            coefficients: Vec::new(),
            intercept: 0.0,
            n_iter: 0,
            converged: false,
        }
    }

    pub fn params(&self) -> &LogisticRegressionParams {
        &self.params
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn is_fitted(&self) -> bool {
        !self.coefficients.is_empty()
    }

    pub fn number_of_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        if !self.is_fitted() {
            return Err(DowntimeError::internal("Classifier has not been fitted"));
        }
        if features.len() != self.coefficients.len() {
            return Err(DowntimeError::internal(format!(
                "X has {} features, but the model is expecting {} features as input",
                features.len(),
                self.coefficients.len()
            )));
        }
        Ok(dot(&self.coefficients, features) + self.intercept)
    }

    /// `[P(class 0), P(class 1)]`.
    pub fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        let p1 = sigmoid(self.decision_function(features)?);
        Ok([1.0 - p1, p1])
    }

    fn objective(&self, theta: &[f64], x: &[Vec<f64>], y: &[f64], w: &[f64]) -> f64 {
        let d = x.first().map(Vec::len).unwrap_or_default();
        let b = if self.params.fit_intercept { theta[d] } else { 0.0 };
        let mut total = 0.0;
        for i in 0..x.len() {
            let z = dot(&theta[..d], &x[i]) + b;
            total += w[i] * (softplus(z) - y[i] * z);
        }
        let penalty: f64 = theta[..d].iter().map(|t| t * t).sum();
        total + penalty / (2.0 * self.params.c)
    }

    fn fit_arrays(&mut self, x: &[Vec<f64>], y: &[f64], w: &[f64]) -> Result<()> {
        let d = x[0].len();
        let m = d + usize::from(self.params.fit_intercept);
        let inv_c = 1.0 / self.params.c;

        let mut theta = vec![0.0; m];
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.params.max_iter {
            iterations = iter + 1;

            let mut grad = vec![0.0; m];
            let mut hess = vec![vec![0.0; m]; m];
            let mut row = vec![1.0; m];

            for i in 0..x.len() {
                row[..d].copy_from_slice(&x[i]);
                let z = dot(&theta, &row);
                let p = sigmoid(z);
                let r = w[i] * (p - y[i]);
                let s = w[i] * p * (1.0 - p);
                for j in 0..m {
                    grad[j] += r * row[j];
                    for k in j..m {
                        hess[j][k] += s * row[j] * row[k];
                    }
                }
            }
            for j in 0..m {
                for k in 0..j {
                    hess[j][k] = hess[k][j];
                }
            }
            for j in 0..d {
                grad[j] += theta[j] * inv_c;
                hess[j][j] += inv_c;
            }

            let Some(delta) = solve_linear_system(hess, grad.clone()) else {
                return Err(DowntimeError::training(
                    "Logistic regression failed: Hessian is singular",
                ));
            };

            let f0 = self.objective(&theta, x, y, w);
            let slope = dot(&grad, &delta);
            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_HALVINGS {
                let candidate: Vec<f64> =
                    theta.iter().zip(&delta).map(|(t, dl)| t - step * dl).collect();
                let f1 = self.objective(&candidate, x, y, w);
                if f1.is_finite() && f1 <= f0 - ARMIJO * step * slope {
                    accepted = Some(candidate);
                    break;
                }
                step *= 0.5;
            }

            let Some(next) = accepted else {
                // No descent left at machine precision.
                converged = true;
                break;
            };

            let max_step = delta
                .iter()
                .map(|dl| (step * dl).abs())
                .fold(0.0_f64, f64::max);
            theta = next;

            if theta.iter().any(|t| !t.is_finite()) {
                return Err(DowntimeError::training(
                    "Logistic regression diverged to non-finite coefficients",
                ));
            }
            if max_step < self.params.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = self.params.max_iter,
                "logistic regression hit the iteration limit before converging"
            );
        }

        self.intercept = if self.params.fit_intercept { theta[d] } else { 0.0 };
        theta.truncate(d);
        self.coefficients = theta;
        self.n_iter = iterations;
        self.converged = converged;

        debug!(
            n_iter = self.n_iter,
            converged = self.converged,
            coefficients = ?self.coefficients,
            intercept = self.intercept,
            "logistic regression fitted"
        );
        Ok(())
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticRegressionParams::default())
    }
}

impl Classifier for LogisticRegression {
    fn train(&mut self, training: &Dataset) -> Result<()> {
        if !(self.params.c > 0.0 && self.params.c.is_finite()) {
            return Err(DowntimeError::internal(format!(
                "C must be a positive finite number, got {}",
                self.params.c
            )));
        }
        if training.is_empty() {
            return Err(DowntimeError::training(
                "Found array with 0 sample(s) while a minimum of 1 is required",
            ));
        }

        let dist = training.class_distribution();
        let present: Vec<usize> = dist
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(c, _)| c)
            .collect();
        if present.len() < 2 {
            let only = present.first().copied().unwrap_or_default();
            return Err(DowntimeError::training(format!(
                "This solver needs samples of at least 2 classes in the data, but the data contains only one class: {only}"
            )));
        }
        if dist.len() > 2 {
            return Err(DowntimeError::training(format!(
                "Expected a binary label, found {} classes",
                dist.len()
            )));
        }

        let mut x = Vec::with_capacity(training.len());
        let mut y = Vec::with_capacity(training.len());
        let mut w = Vec::with_capacity(training.len());
        for inst in training.instances() {
            let Some(label) = inst.class_value() else {
                continue;
            };
            x.push(inst.features().to_vec());
            y.push(label);
            w.push(inst.weight().max(0.0));
        }

        let d = x[0].len();
        if d == 0 || x.iter().any(|r| r.len() != d) {
            return Err(DowntimeError::training(
                "Every training row must carry the same non-zero number of features",
            ));
        }

        self.fit_arrays(&x, &y, &w)
    }

    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        match self.predict_proba(instance.features()) {
            Ok(p) => p.to_vec(),
            Err(_) => Vec::new(),
        }
    }
}
