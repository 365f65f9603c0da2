//! Classifier implementations.
//!
//! Each estimator is a plain serializable struct with `validate` and
//! `predict_proba`; `Estimator` dispatches over them so ensembles can nest
//! any kind.

pub mod linear;
pub mod model;
pub mod naive_bayes;
pub mod stacking;
pub mod tree;

pub use linear::*;
pub use model::*;
pub use naive_bayes::*;
pub use stacking::*;
pub use tree::*;

use crate::error::ArtifactError;

pub(crate) fn dot(w: &[f64], x: &[f64]) -> f64 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

/// Replace log-scores with normalized probabilities (log-sum-exp).
pub(crate) fn softmax_in_place(v: &mut [f64]) {
    let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for x in v.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    for x in v.iter_mut() {
        *x /= sum;
    }
}

pub(crate) fn check_width(what: &str, expected: usize, x: &[f64]) -> Result<(), ArtifactError> {
    if x.len() != expected {
        return Err(ArtifactError::Corrupt(format!(
            "{what} expects {expected} inputs, got {}",
            x.len()
        )));
    }
    Ok(())
}
