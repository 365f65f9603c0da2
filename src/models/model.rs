//! Model artifact and estimator dispatch.
//!
//! The artifact records, next to the fitted estimator, the feature names in
//! the exact order the estimator was trained on. The handler lays out every
//! row from that list, so the column order is never maintained by hand.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::{DecisionTree, GaussianNb, LogisticRegression, StackingClassifier};

/// A fitted classifier producing one probability per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Logistic(LogisticRegression),
    DecisionTree(DecisionTree),
    GaussianNb(GaussianNb),
    Stacking(StackingClassifier),
}

impl Estimator {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Estimator::Logistic(_) => "logistic",
            Estimator::DecisionTree(_) => "decision_tree",
            Estimator::GaussianNb(_) => "gaussian_nb",
            Estimator::Stacking(_) => "stacking",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Estimator::Logistic(m) => m.n_features(),
            Estimator::DecisionTree(m) => m.n_features,
            Estimator::GaussianNb(m) => m.n_features(),
            Estimator::Stacking(m) => m.n_features(),
        }
    }

    /// Number of class probabilities produced.
    pub fn n_outputs(&self) -> usize {
        match self {
            Estimator::Logistic(m) => m.n_outputs(),
            Estimator::DecisionTree(m) => m.n_classes,
            Estimator::GaussianNb(m) => m.n_outputs(),
            Estimator::Stacking(m) => m.n_outputs(),
        }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Estimator::Logistic(m) => m.validate(),
            Estimator::DecisionTree(m) => m.validate(),
            Estimator::GaussianNb(m) => m.validate(),
            Estimator::Stacking(m) => m.validate(),
        }
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        match self {
            Estimator::Logistic(m) => m.predict_proba(x),
            Estimator::DecisionTree(m) => m.predict_proba(x),
            Estimator::GaussianNb(m) => m.predict_proba(x),
            Estimator::Stacking(m) => m.predict_proba(x),
        }
    }

    /// One line per estimator, indented by nesting depth (for `approval inspect`).
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.describe_into(0, None, &mut out);
        out
    }

    fn describe_into(&self, depth: usize, name: Option<&str>, out: &mut Vec<String>) {
        let pad = "  ".repeat(depth);
        let label = name.map(|n| format!("{n}: ")).unwrap_or_default();
        let detail = match self {
            Estimator::Logistic(m) => format!("{} coefficient row(s)", m.coef.len()),
            Estimator::DecisionTree(m) => format!("{} nodes, depth {}", m.nodes.len(), m.depth()),
            Estimator::GaussianNb(m) => format!("{} classes", m.n_outputs()),
            Estimator::Stacking(m) => format!(
                "{} base estimator(s), passthrough={}",
                m.estimators.len(),
                m.passthrough
            ),
        };
        out.push(format!(
            "{pad}{label}{} [{} in -> {} out] {detail}",
            self.kind_name(),
            self.n_features(),
            self.n_outputs()
        ));
        if let Estimator::Stacking(m) = self {
            for named in &m.estimators {
                named
                    .estimator
                    .describe_into(depth + 1, Some(&named.name), out);
            }
            m.final_estimator.describe_into(depth + 1, Some("final"), out);
        }
    }
}

/// Serialized trained model plus the metadata needed to feed and read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Input columns in training order.
    pub feature_names: Vec<String>,
    /// Class labels, indexed like the estimator's probability output.
    pub classes: Vec<String>,
    /// The label that means "approve".
    pub positive_class: String,
    pub estimator: Estimator,
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_names.is_empty() {
            return Err(ArtifactError::invalid("model", "no feature names recorded"));
        }
        let mut sorted: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(ArtifactError::invalid(
                "model",
                format!("duplicate feature name '{}'", w[0]),
            ));
        }
        if self.classes.len() < 2 {
            return Err(ArtifactError::invalid("model", "at least two classes are required"));
        }
        let mut classes: Vec<&str> = self.classes.iter().map(String::as_str).collect();
        classes.sort_unstable();
        if let Some(w) = classes.windows(2).find(|w| w[0] == w[1]) {
            return Err(ArtifactError::invalid("model", format!("duplicate class '{}'", w[0])));
        }
        if !self.classes.contains(&self.positive_class) {
            return Err(ArtifactError::invalid(
                "model",
                format!("positive class '{}' is not one of the model classes", self.positive_class),
            ));
        }
        self.estimator.validate()?;
        if self.estimator.n_features() != self.feature_names.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "estimator expects {} features but {} feature names are recorded",
                    self.estimator.n_features(),
                    self.feature_names.len()
                ),
            ));
        }
        if self.estimator.n_outputs() != self.classes.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "estimator scores {} classes but {} labels are recorded",
                    self.estimator.n_outputs(),
                    self.classes.len()
                ),
            ));
        }
        Ok(())
    }

    /// Score one row and pick the most probable class.
    ///
    /// Returns `(class index, probabilities)`. Ties go to the lowest index.
    pub fn predict(&self, x: &[f64]) -> Result<(usize, Vec<f64>), ArtifactError> {
        let proba = self.estimator.predict_proba(x)?;
        if proba.len() != self.classes.len() || proba.iter().any(|p| !p.is_finite()) {
            return Err(ArtifactError::Corrupt(format!(
                "estimator returned {} probabilities for {} classes",
                proba.len(),
                self.classes.len()
            )));
        }
        let mut best = 0;
        for (i, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok((best, proba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic_artifact() -> ModelArtifact {
        ModelArtifact {
            feature_names: vec!["a".to_string(), "b".to_string()],
            classes: vec!["no".to_string(), "yes".to_string()],
            positive_class: "yes".to_string(),
            estimator: Estimator::Logistic(LogisticRegression {
                coef: vec![vec![1.0, 1.0]],
                intercept: vec![-1.0],
            }),
        }
    }

    #[test]
    fn predict_picks_argmax() {
        let m = logistic_artifact();
        m.validate().unwrap();
        let (idx, proba) = m.predict(&[1.0, 1.0]).unwrap();
        assert_eq!(idx, 1);
        assert!(proba[1] > 0.5);
        let (idx, _) = m.predict(&[0.0, 0.0]).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn tie_resolves_to_lowest_index() {
        let m = logistic_artifact();
        let (idx, proba) = m.predict(&[0.5, 0.5]).unwrap();
        assert_eq!(proba[0], proba[1]);
        assert_eq!(idx, 0);
    }

    #[test]
    fn feature_count_must_match_estimator() {
        let mut m = logistic_artifact();
        m.feature_names.push("c".to_string());
        assert!(m.validate().is_err());
    }

    #[test]
    fn positive_class_must_exist() {
        let mut m = logistic_artifact();
        m.positive_class = "approve".to_string();
        assert!(m.validate().is_err());
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let mut m = logistic_artifact();
        m.classes = vec!["yes".to_string(), "yes".to_string()];
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate class 'yes'"));
    }

    #[test]
    fn estimator_kind_is_tagged_in_json() {
        let json = serde_json::to_value(&logistic_artifact()).unwrap();
        assert_eq!(json["estimator"]["kind"], "logistic");
        let back: ModelArtifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, logistic_artifact());
    }
}
