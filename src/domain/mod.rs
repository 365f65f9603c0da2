//! Domain types used throughout the handler and front-ends.
//!
//! This module defines:
//!
//! - configuration enums (`OutOfRangePolicy`, `Lang`)
//! - the ordered model input (`FeatureRow`)
//! - prediction outputs (`Prediction`, `ClassProbability`)

pub mod types;

pub use types::*;
