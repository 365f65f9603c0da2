//! One-hot category encoder.
//!
//! The category list is fixed when the artifact is built. Its order defines
//! both the indicator positions and the output column names
//! (`"{feature}_{category}"`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, InputError};

/// Fitted one-hot encoder for a single categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    /// Source column name (e.g. `Felder`).
    pub feature: String,
    /// Known categories in their fitted order.
    pub categories: Vec<String>,
}

impl CategoryEncoder {
    pub fn new(feature: impl Into<String>, categories: Vec<String>) -> Result<Self, ArtifactError> {
        let encoder = Self {
            feature: feature.into(),
            categories,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Check the fitted state: a non-empty, duplicate-free category list.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature.trim().is_empty() {
            return Err(ArtifactError::invalid("encoder", "feature name is empty"));
        }
        if self.categories.is_empty() {
            return Err(ArtifactError::invalid("encoder", "no categories"));
        }
        let mut seen = HashSet::new();
        for c in &self.categories {
            if !seen.insert(c.as_str()) {
                return Err(ArtifactError::invalid(
                    "encoder",
                    format!("duplicate category '{c}'"),
                ));
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Output column names, one per category.
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.feature, c))
            .collect()
    }

    /// Encode a category as an indicator vector.
    ///
    /// Matching is exact: categories are labels fixed at fit time, and a
    /// near-miss is still an unknown category.
    pub fn encode(&self, category: &str) -> Result<Vec<f64>, InputError> {
        let idx = self
            .index_of(category)
            .ok_or_else(|| InputError::UnsupportedCategory {
                category: category.to_string(),
                known: self.categories.clone(),
            })?;
        let mut out = vec![0.0; self.width()];
        out[idx] = 1.0;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felder() -> CategoryEncoder {
        let categories = [
            "activo", "equilibrio", "intuitivo", "reflexivo", "secuencial", "sensorial", "verbal",
            "visual",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        CategoryEncoder::new("Felder", categories).unwrap()
    }

    #[test]
    fn every_category_sets_exactly_its_own_slot() {
        let enc = felder();
        for (i, c) in enc.categories.iter().enumerate() {
            let v = enc.encode(c).unwrap();
            assert_eq!(v.len(), enc.width());
            assert_eq!(v.iter().filter(|x| **x == 1.0).count(), 1);
            assert_eq!(v.iter().filter(|x| **x == 0.0).count(), enc.width() - 1);
            assert_eq!(v[i], 1.0, "category {c}");
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let enc = felder();
        let err = enc.encode("kinestesico").unwrap_err();
        match err {
            InputError::UnsupportedCategory { category, known } => {
                assert_eq!(category, "kinestesico");
                assert_eq!(known.len(), 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(enc.encode("Visual").is_err());
    }

    #[test]
    fn feature_names_follow_category_order() {
        let enc = felder();
        let names = enc.feature_names();
        assert_eq!(names[0], "Felder_activo");
        assert_eq!(names[7], "Felder_visual");
    }

    #[test]
    fn duplicate_or_empty_categories_are_invalid() {
        assert!(CategoryEncoder::new("Felder", vec![]).is_err());
        assert!(
            CategoryEncoder::new("Felder", vec!["a".to_string(), "a".to_string()]).is_err()
        );
    }
}
