//! Gaussian naive Bayes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::{check_width, softmax_in_place};

/// Per-class feature means (`theta`), variances (`var`) and priors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNb {
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
    pub class_prior: Vec<f64>,
}

impl GaussianNb {
    pub fn n_features(&self) -> usize {
        self.theta.first().map(Vec::len).unwrap_or(0)
    }

    pub fn n_outputs(&self) -> usize {
        self.class_prior.len()
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        let k = self.class_prior.len();
        if k < 2 {
            return Err(ArtifactError::invalid("model", "naive Bayes needs at least two classes"));
        }
        if self.theta.len() != k || self.var.len() != k {
            return Err(ArtifactError::invalid("model", "naive Bayes parameter shapes disagree"));
        }
        let n = self.n_features();
        if n == 0 || self.theta.iter().chain(&self.var).any(|row| row.len() != n) {
            return Err(ArtifactError::invalid("model", "ragged naive Bayes parameters"));
        }
        if self.var.iter().flatten().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ArtifactError::invalid("model", "naive Bayes variances must be positive"));
        }
        if self.theta.iter().flatten().any(|v| !v.is_finite())
            || self.class_prior.iter().any(|p| !p.is_finite() || *p <= 0.0)
        {
            return Err(ArtifactError::invalid("model", "invalid naive Bayes means or priors"));
        }
        Ok(())
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_width("naive Bayes", self.n_features(), x)?;
        let mut jll: Vec<f64> = self
            .theta
            .iter()
            .zip(&self.var)
            .zip(&self.class_prior)
            .map(|((mu, var), prior)| {
                let mut ll = prior.ln();
                for ((xi, m), v) in x.iter().zip(mu).zip(var) {
                    ll -= 0.5 * (2.0 * PI * v).ln();
                    ll -= (xi - m).powi(2) / (2.0 * v);
                }
                ll
            })
            .collect();
        softmax_in_place(&mut jll);
        Ok(jll)
    }
}
