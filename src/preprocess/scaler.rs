//! Min-max range scaler.
//!
//! `scaled = (value - data_min) * scale + lo`, with
//! `scale = (hi - lo) / (data_max - data_min)`.
//!
//! A zero-width domain uses `scale = 1`, so every in-domain value maps to `lo`.

use serde::{Deserialize, Serialize};

use crate::domain::OutOfRangePolicy;
use crate::error::{ArtifactError, InputError};

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Fitted min-max scaler for a single numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeScaler {
    /// Source column name (e.g. `Examen_admisión_Universidad`).
    pub feature: String,
    pub data_min: f64,
    pub data_max: f64,
    #[serde(default = "default_feature_range")]
    pub feature_range: [f64; 2],
    /// Column name the model knows the scaled value by. Defaults to `"{feature}_scaled"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

/// A scaled value plus whether clamping changed the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub value: f64,
    pub clamped: bool,
}

impl RangeScaler {
    pub fn new(feature: impl Into<String>, data_min: f64, data_max: f64) -> Result<Self, ArtifactError> {
        let scaler = Self {
            feature: feature.into(),
            data_min,
            data_max,
            feature_range: default_feature_range(),
            output_name: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature.trim().is_empty() {
            return Err(ArtifactError::invalid("scaler", "feature name is empty"));
        }
        if !(self.data_min.is_finite() && self.data_max.is_finite()) {
            return Err(ArtifactError::invalid("scaler", "non-finite domain bounds"));
        }
        if self.data_min > self.data_max {
            return Err(ArtifactError::invalid(
                "scaler",
                format!("data_min {} exceeds data_max {}", self.data_min, self.data_max),
            ));
        }
        let [lo, hi] = self.feature_range;
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(ArtifactError::invalid(
                "scaler",
                format!("feature_range [{lo}, {hi}] must be increasing"),
            ));
        }
        Ok(())
    }

    pub fn output_name(&self) -> String {
        self.output_name
            .clone()
            .unwrap_or_else(|| format!("{}_scaled", self.feature))
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.data_min, self.data_max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.data_min && value <= self.data_max
    }

    fn scale(&self) -> f64 {
        let width = self.data_max - self.data_min;
        if width == 0.0 {
            1.0
        } else {
            (self.feature_range[1] - self.feature_range[0]) / width
        }
    }

    /// Linear map with no domain checks.
    pub fn map(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.feature_range[0]
    }

    /// Scale a user-supplied score according to `policy`.
    pub fn transform(&self, value: f64, policy: OutOfRangePolicy) -> Result<Scaled, InputError> {
        if !value.is_finite() {
            return Err(InputError::NonFiniteScore(value));
        }
        if self.contains(value) {
            return Ok(Scaled {
                value: self.map(value),
                clamped: false,
            });
        }
        match policy {
            OutOfRangePolicy::Reject => Err(InputError::ScoreOutOfRange {
                value,
                min: self.data_min,
                max: self.data_max,
            }),
            OutOfRangePolicy::Clamp => Ok(Scaled {
                value: self.map(value.clamp(self.data_min, self.data_max)),
                clamped: true,
            }),
            OutOfRangePolicy::Extrapolate => Ok(Scaled {
                value: self.map(value),
                clamped: false,
            }),
        }
    }
}
