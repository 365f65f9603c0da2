//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the handler and every front-end (form, one-shot, batch)
//! - printed as JSON by `approval predict --json`
//! - written into prediction records for later inspection

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What to do with a score outside the scaler's fitted domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Refuse the submission with `InputError::ScoreOutOfRange`.
    #[default]
    Reject,
    /// Clip the score into `[data_min, data_max]` before scaling.
    Clamp,
    /// Apply the linear map as-is; results fall outside the feature range.
    Extrapolate,
}

impl OutOfRangePolicy {
    pub fn display_name(self) -> &'static str {
        match self {
            OutOfRangePolicy::Reject => "reject",
            OutOfRangePolicy::Clamp => "clamp",
            OutOfRangePolicy::Extrapolate => "extrapolate",
        }
    }
}

/// UI language for user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    /// Parse the `APPROVAL_LANG` style value (`en`, `es`, case-insensitive).
    pub fn parse(s: &str) -> Option<Lang> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Lang::En),
            "es" | "spanish" | "español" => Some(Lang::Es),
            _ => None,
        }
    }

    pub fn toggle(self) -> Lang {
        match self {
            Lang::En => Lang::Es,
            Lang::Es => Lang::En,
        }
    }
}

/// One named model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: f64,
}

/// A single feature row laid out in the model's training order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    pub features: Vec<Feature>,
}

impl FeatureRow {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Positional values, as the model consumes them.
    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.iter().find(|f| f.name == name).map(|f| f.value)
    }
}

/// Probability assigned to one class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub class: String,
    pub probability: f64,
}

/// Outcome of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    pub score: f64,
    /// Score after out-of-range handling and min-max scaling.
    pub scaled_score: f64,
    /// True when the clamp policy moved the score into the domain.
    pub clamped: bool,
    pub row: FeatureRow,
    pub probabilities: Vec<ClassProbability>,
    /// Predicted class label as recorded in the model artifact.
    pub label: String,
    /// Whether `label` is the artifact's positive ("approve") class.
    pub approved: bool,
}

impl Prediction {
    /// Probability of the predicted label.
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .iter()
            .find(|p| p.class == self.label)
            .map(|p| p.probability)
            .unwrap_or(f64::NAN)
    }
}
