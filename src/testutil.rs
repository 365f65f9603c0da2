//! Fixtures for unit tests: the demo artifact bundle shipped in `artifacts/`.

use std::path::Path;

use crate::config::ArtifactPaths;
use crate::io::ArtifactBundle;

const ENCODER_JSON: &str = include_str!("../artifacts/encoder.json");
const SCALER_JSON: &str = include_str!("../artifacts/scaler.json");
const MODEL_JSON: &str = include_str!("../artifacts/model.json");

pub fn demo_bundle() -> ArtifactBundle {
    ArtifactBundle {
        encoder: serde_json::from_str(ENCODER_JSON).expect("demo encoder"),
        scaler: serde_json::from_str(SCALER_JSON).expect("demo scaler"),
        model: serde_json::from_str(MODEL_JSON).expect("demo model"),
    }
}

pub fn demo_context() -> crate::app::pipeline::PredictionContext {
    crate::app::pipeline::PredictionContext::new(demo_bundle(), crate::domain::OutOfRangePolicy::Reject)
        .expect("demo context")
}

/// Write the demo bundle into `dir` and return its paths.
pub fn write_demo_bundle(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir);
    std::fs::write(&paths.encoder, ENCODER_JSON).expect("write encoder");
    std::fs::write(&paths.scaler, SCALER_JSON).expect("write scaler");
    std::fs::write(&paths.model, MODEL_JSON).expect("write model");
    paths
}
