//! Logistic regression.
//!
//! Binary models store a single coefficient row (the positive class logit);
//! multiclass models store one row per class and use softmax.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::{check_width, dot, softmax_in_place};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    pub fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    pub fn n_outputs(&self) -> usize {
        if self.coef.len() == 1 { 2 } else { self.coef.len() }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.coef.is_empty() || self.n_features() == 0 {
            return Err(ArtifactError::invalid("model", "logistic regression has no coefficients"));
        }
        if self.coef.iter().any(|row| row.len() != self.n_features()) {
            return Err(ArtifactError::invalid("model", "ragged logistic coefficient matrix"));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "logistic intercept has {} entries for {} coefficient rows",
                    self.intercept.len(),
                    self.coef.len()
                ),
            ));
        }
        let finite = self.coef.iter().flatten().chain(&self.intercept).all(|v| v.is_finite());
        if !finite {
            return Err(ArtifactError::invalid("model", "non-finite logistic parameters"));
        }
        Ok(())
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_width("logistic regression", self.n_features(), x)?;
        if self.coef.len() == 1 {
            let z = dot(&self.coef[0], x) + self.intercept[0];
            let p = sigmoid(z);
            return Ok(vec![1.0 - p, p]);
        }
        let mut logits: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| dot(w, x) + b)
            .collect();
        softmax_in_place(&mut logits);
        Ok(logits)
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
