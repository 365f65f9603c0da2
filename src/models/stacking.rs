//! Stacking ensemble.
//!
//! Each base estimator scores the row; their class probabilities become the
//! meta features of the final estimator. With exactly two classes only the
//! positive-class column is kept per base estimator, since the other column
//! is its complement.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::{Estimator, check_width};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEstimator {
    pub name: String,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingClassifier {
    pub estimators: Vec<NamedEstimator>,
    pub final_estimator: Box<Estimator>,
    /// Append the original row to the meta features.
    #[serde(default)]
    pub passthrough: bool,
}

impl StackingClassifier {
    pub fn n_features(&self) -> usize {
        self.estimators
            .first()
            .map(|e| e.estimator.n_features())
            .unwrap_or(0)
    }

    pub fn n_outputs(&self) -> usize {
        self.final_estimator.n_outputs()
    }

    fn columns_per_estimator(n_classes: usize) -> usize {
        if n_classes == 2 { 1 } else { n_classes }
    }

    /// Width of the row the final estimator consumes.
    pub fn meta_width(&self) -> usize {
        let stacked: usize = self
            .estimators
            .iter()
            .map(|e| Self::columns_per_estimator(e.estimator.n_outputs()))
            .sum();
        if self.passthrough {
            stacked + self.n_features()
        } else {
            stacked
        }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.estimators.is_empty() {
            return Err(ArtifactError::invalid("model", "stacking ensemble has no base estimators"));
        }
        let n_features = self.n_features();
        let n_classes = self.n_outputs();
        for named in &self.estimators {
            named.estimator.validate()?;
            if named.estimator.n_features() != n_features {
                return Err(ArtifactError::invalid(
                    "model",
                    format!(
                        "base estimator '{}' expects {} features, '{}' expects {n_features}",
                        named.name,
                        named.estimator.n_features(),
                        self.estimators[0].name
                    ),
                ));
            }
            if named.estimator.n_outputs() != n_classes {
                return Err(ArtifactError::invalid(
                    "model",
                    format!(
                        "base estimator '{}' scores {} classes, final estimator scores {n_classes}",
                        named.name,
                        named.estimator.n_outputs()
                    ),
                ));
            }
        }
        self.final_estimator.validate()?;
        if self.final_estimator.n_features() != self.meta_width() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "final estimator expects {} meta features, ensemble produces {}",
                    self.final_estimator.n_features(),
                    self.meta_width()
                ),
            ));
        }
        Ok(())
    }

    /// Meta features for one row, in base-estimator order.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_width("stacking ensemble", self.n_features(), x)?;
        let mut meta = Vec::with_capacity(self.meta_width());
        for named in &self.estimators {
            let proba = named.estimator.predict_proba(x)?;
            if proba.len() == 2 {
                meta.push(proba[1]);
            } else {
                meta.extend(proba);
            }
        }
        if self.passthrough {
            meta.extend_from_slice(x);
        }
        Ok(meta)
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        let meta = self.transform(x)?;
        self.final_estimator.predict_proba(&meta)
    }
}
