//! The prediction request handler shared by every front-end.
//!
//! category + score -> one-hot -> scaled score -> row in model order -> predict
//!
//! `PredictionContext` is built once at startup from the loaded artifacts and
//! is read-only afterwards. Building it resolves where every model column comes
//! from, so a disagreement between the preprocessing outputs and the model's
//! recorded feature names stops the program before any input is accepted.

use std::collections::HashSet;

use crate::domain::{ClassProbability, Feature, FeatureRow, OutOfRangePolicy, Prediction};
use crate::error::{ArtifactError, PredictError};
use crate::io::ArtifactBundle;
use crate::models::ModelArtifact;
use crate::preprocess::{CategoryEncoder, RangeScaler};

/// Where a model column gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Score,
    Category(usize),
}

/// Immutable state for answering prediction requests.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    encoder: CategoryEncoder,
    scaler: RangeScaler,
    model: ModelArtifact,
    policy: OutOfRangePolicy,
    /// One entry per model column, in model order.
    layout: Vec<Source>,
}

impl PredictionContext {
    pub fn new(bundle: ArtifactBundle, policy: OutOfRangePolicy) -> Result<Self, ArtifactError> {
        let ArtifactBundle {
            encoder,
            scaler,
            model,
        } = bundle;
        encoder.validate()?;
        scaler.validate()?;
        model.validate()?;

        let layout = resolve_layout(&encoder, &scaler, &model)?;
        tracing::debug!(columns = ?model.feature_names, "column layout resolved from model artifact");
        Ok(Self {
            encoder,
            scaler,
            model,
            policy,
            layout,
        })
    }

    pub fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &RangeScaler {
        &self.scaler
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn policy(&self) -> OutOfRangePolicy {
        self.policy
    }

    pub fn categories(&self) -> &[String] {
        &self.encoder.categories
    }

    /// The fitted score domain; the form bounds its entry with this.
    pub fn score_domain(&self) -> (f64, f64) {
        self.scaler.domain()
    }

    pub fn column_order(&self) -> &[String] {
        &self.model.feature_names
    }

    /// Assemble the feature row for a submission without scoring it.
    pub fn build_row(&self, category: &str, score: f64) -> Result<(FeatureRow, f64, bool), PredictError> {
        let one_hot = self.encoder.encode(category)?;
        let scaled = self.scaler.transform(score, self.policy)?;

        let features = self
            .model
            .feature_names
            .iter()
            .zip(&self.layout)
            .map(|(name, source)| Feature {
                name: name.clone(),
                value: match source {
                    Source::Score => scaled.value,
                    Source::Category(i) => one_hot[*i],
                },
            })
            .collect();
        Ok((FeatureRow { features }, scaled.value, scaled.clamped))
    }

    /// Handle one submission.
    pub fn predict(&self, category: &str, score: f64) -> Result<Prediction, PredictError> {
        let (row, scaled_score, clamped) = match self.build_row(category, score) {
            Ok(built) => built,
            Err(err) => {
                tracing::warn!(category, score, error = %err, "submission rejected");
                return Err(err);
            }
        };

        let (idx, proba) = self.model.predict(&row.values())?;
        let label = self.model.classes[idx].clone();
        let approved = label == self.model.positive_class;
        tracing::debug!(category, score, scaled_score, clamped, %label, "prediction");

        let probabilities = self
            .model
            .classes
            .iter()
            .zip(proba)
            .map(|(class, probability)| ClassProbability {
                class: class.clone(),
                probability,
            })
            .collect();

        Ok(Prediction {
            category: category.to_string(),
            score,
            scaled_score,
            clamped,
            row,
            probabilities,
            label,
            approved,
        })
    }
}

fn resolve_layout(
    encoder: &CategoryEncoder,
    scaler: &RangeScaler,
    model: &ModelArtifact,
) -> Result<Vec<Source>, ArtifactError> {
    let score_name = scaler.output_name();
    let category_names = encoder.feature_names();

    let mut produced: Vec<String> = Vec::with_capacity(category_names.len() + 1);
    produced.push(score_name.clone());
    produced.extend(category_names.iter().cloned());

    let mut seen = HashSet::with_capacity(produced.len());
    if let Some(dup) = produced.iter().find(|name| !seen.insert(name.as_str())) {
        tracing::error!(column = %dup, "preprocessing produces the same column twice");
        return Err(ArtifactError::invalid(
            "scaler",
            format!("output column '{dup}' collides with an encoder column"),
        ));
    }

    let mut missing = Vec::new();
    let mut layout = Vec::with_capacity(model.feature_names.len());
    for name in &model.feature_names {
        if *name == score_name {
            layout.push(Source::Score);
        } else if let Some(i) = category_names.iter().position(|c| c == name) {
            layout.push(Source::Category(i));
        } else {
            missing.push(name.clone());
        }
    }

    let expected: HashSet<&str> = model.feature_names.iter().map(String::as_str).collect();
    let unexpected: Vec<String> = produced
        .into_iter()
        .filter(|name| !expected.contains(name.as_str()))
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        tracing::error!(?missing, ?unexpected, "model columns disagree with preprocessing output");
        return Err(ArtifactError::ColumnMismatch { missing, unexpected });
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::testutil::demo_bundle;

    fn ctx() -> PredictionContext {
        PredictionContext::new(demo_bundle(), OutOfRangePolicy::Reject).unwrap()
    }

    #[test]
    fn visual_five_of_six_builds_expected_row() {
        let ctx = ctx();
        let (row, scaled, clamped) = ctx.build_row("visual", 5.0).unwrap();
        assert!(!clamped);
        assert!((scaled - 5.0 / 6.0).abs() < 1e-12);

        let names: Vec<&str> = row.names().collect();
        assert_eq!(names, ctx.column_order().iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(names[0], "Examen_admisión_Universidad_scaled");

        assert!((row.features[0].value - 0.8333).abs() < 1e-4);
        for f in &row.features[1..] {
            let expected = if f.name == "Felder_visual" { 1.0 } else { 0.0 };
            assert_eq!(f.value, expected, "{}", f.name);
        }
    }

    #[test]
    fn column_order_follows_model_not_preprocessing() {
        let mut bundle = demo_bundle();
        // Reverse the recorded training order; the row must follow it.
        let crate::models::Estimator::Stacking(stack) = &mut bundle.model.estimator else {
            panic!("demo model is a stacking ensemble");
        };
        bundle.model.feature_names.reverse();
        for named in &mut stack.estimators {
            reverse_inputs(&mut named.estimator);
        }
        let ctx = PredictionContext::new(bundle, OutOfRangePolicy::Reject).unwrap();
        let (row, _, _) = ctx.build_row("activo", 3.0).unwrap();
        assert_eq!(row.features[0].name, "Felder_visual");
        assert_eq!(row.features[0].value, 0.0);
        assert_eq!(row.features[7].name, "Felder_activo");
        assert_eq!(row.features[7].value, 1.0);
        assert_eq!(row.features[8].name, "Examen_admisión_Universidad_scaled");
        assert!((row.features[8].value - 0.5).abs() < 1e-12);

        // Same prediction as the original layout, since the estimators were permuted too.
        let original = ctx_predict_label("activo", 3.0);
        assert_eq!(ctx.predict("activo", 3.0).unwrap().label, original);
    }

    fn ctx_predict_label(category: &str, score: f64) -> String {
        ctx().predict(category, score).unwrap().label
    }

    fn reverse_inputs(estimator: &mut crate::models::Estimator) {
        use crate::models::{Estimator, TreeNode};
        match estimator {
            Estimator::Logistic(m) => m.coef.iter_mut().for_each(|r| r.reverse()),
            Estimator::GaussianNb(m) => {
                m.theta.iter_mut().for_each(|r| r.reverse());
                m.var.iter_mut().for_each(|r| r.reverse());
            }
            Estimator::DecisionTree(m) => {
                let n = m.n_features;
                for node in &mut m.nodes {
                    if let TreeNode::Split { feature, .. } = node {
                        *feature = n - 1 - *feature;
                    }
                }
            }
            Estimator::Stacking(_) => unreachable!("no nested ensembles in the demo model"),
        }
    }

    #[test]
    fn unknown_category_is_a_typed_input_error() {
        let err = ctx().predict("kinestesico", 4.0).unwrap_err();
        assert!(err.is_input());
        assert!(matches!(
            err,
            PredictError::Input(InputError::UnsupportedCategory { .. })
        ));
    }

    #[test]
    fn out_of_domain_score_follows_policy() {
        let err = ctx().predict("visual", 9.5).unwrap_err();
        assert!(matches!(err, PredictError::Input(InputError::ScoreOutOfRange { .. })));

        let clamp = PredictionContext::new(demo_bundle(), OutOfRangePolicy::Clamp).unwrap();
        let p = clamp.predict("visual", 9.5).unwrap();
        assert!(p.clamped);
        assert_eq!(p.scaled_score, 1.0);
    }

    #[test]
    fn predictions_are_deterministic() {
        let ctx = ctx();
        let a = ctx.predict("reflexivo", 4.2).unwrap();
        let b = ctx.predict("reflexivo", 4.2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn demo_model_separates_strong_and_weak_submissions() {
        let ctx = ctx();
        let strong = ctx.predict("visual", 5.0).unwrap();
        assert!(strong.approved);
        assert_eq!(strong.label, "approve");
        assert!(strong.confidence() > 0.5);

        let weak = ctx.predict("activo", 0.5).unwrap();
        assert!(!weak.approved);
        assert_eq!(weak.label, "not approve");

        let total: f64 = strong.probabilities.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_columns_fail_at_startup() {
        let mut bundle = demo_bundle();
        bundle.model.feature_names[3] = "Felder_kinestesico".to_string();
        let err = PredictionContext::new(bundle, OutOfRangePolicy::Reject).unwrap_err();
        match err {
            ArtifactError::ColumnMismatch { missing, unexpected } => {
                assert_eq!(missing, vec!["Felder_kinestesico".to_string()]);
                assert_eq!(unexpected, vec!["Felder_intuitivo".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn renamed_scaler_output_is_detected() {
        let mut bundle = demo_bundle();
        bundle.scaler.output_name = Some("exam_scaled".to_string());
        let err = PredictionContext::new(bundle, OutOfRangePolicy::Reject).unwrap_err();
        assert!(matches!(err, ArtifactError::ColumnMismatch { .. }));
    }

    #[test]
    fn scaler_output_colliding_with_encoder_column_is_rejected() {
        let mut bundle = demo_bundle();
        bundle.scaler.output_name = Some("Felder_visual".to_string());
        bundle.model.feature_names = bundle.encoder.feature_names();
        bundle.model.estimator = crate::models::Estimator::Logistic(crate::models::LogisticRegression {
            coef: vec![vec![1.0; 8]],
            intercept: vec![0.0],
        });
        bundle.model.validate().unwrap();

        let err = PredictionContext::new(bundle, OutOfRangePolicy::Reject).unwrap_err();
        match err {
            ArtifactError::Invalid { artifact, message } => {
                assert_eq!(artifact, "scaler");
                assert!(message.contains("Felder_visual"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
