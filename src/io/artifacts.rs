//! Artifact loading.
//!
//! Three JSON documents make up a bundle: the encoder, the scaler and the
//! model. All three are read once at startup; any failure here is fatal and
//! names the offending file.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::ArtifactPaths;
use crate::error::ArtifactError;
use crate::models::ModelArtifact;
use crate::preprocess::{CategoryEncoder, RangeScaler};

/// The three fitted artifacts, as loaded from disk.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub encoder: CategoryEncoder,
    pub scaler: RangeScaler,
    pub model: ModelArtifact,
}

/// Read and deserialize one JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_encoder(path: &Path) -> Result<CategoryEncoder, ArtifactError> {
    let encoder: CategoryEncoder = read_json(path)?;
    encoder.validate()?;
    Ok(encoder)
}

pub fn load_scaler(path: &Path) -> Result<RangeScaler, ArtifactError> {
    let scaler: RangeScaler = read_json(path)?;
    scaler.validate()?;
    Ok(scaler)
}

pub fn load_model(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    let model: ModelArtifact = read_json(path)?;
    model.validate()?;
    Ok(model)
}

/// Load all three artifacts.
///
/// Every path is checked for existence first so a half-deployed bundle is
/// reported in one go rather than one file per restart.
pub fn load_bundle(paths: &ArtifactPaths) -> Result<ArtifactBundle, ArtifactError> {
    let missing: Vec<&Path> = paths
        .all()
        .into_iter()
        .filter(|p| !p.exists())
        .collect();
    if let Some(first) = missing.first() {
        for p in &missing {
            tracing::error!(path = %p.display(), "artifact not found");
        }
        return Err(ArtifactError::Missing {
            path: first.to_path_buf(),
        });
    }

    let encoder = load_encoder(&paths.encoder)?;
    let scaler = load_scaler(&paths.scaler)?;
    let model = load_model(&paths.model)?;
    tracing::info!(
        categories = encoder.width(),
        domain_min = scaler.data_min,
        domain_max = scaler.data_max,
        estimator = model.estimator.kind_name(),
        "artifacts loaded"
    );
    Ok(ArtifactBundle {
        encoder,
        scaler,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_demo_bundle;

    #[test]
    fn loads_a_complete_bundle() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let paths = write_demo_bundle(tmp.path());
        let bundle = load_bundle(&paths).expect("load");
        assert_eq!(bundle.encoder.feature, "Felder");
        assert_eq!(bundle.scaler.domain(), (0.0, 6.0));
        assert_eq!(bundle.model.feature_names.len(), 9);
    }

    #[test]
    fn missing_file_names_the_path() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let paths = write_demo_bundle(tmp.path());
        std::fs::remove_file(&paths.scaler).expect("remove");
        let err = load_bundle(&paths).unwrap_err();
        match err {
            ArtifactError::Missing { path } => assert_eq!(path, paths.scaler),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let paths = write_demo_bundle(tmp.path());
        std::fs::write(&paths.model, "{ not json").expect("write");
        let err = load_bundle(&paths).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { .. }), "{err:?}");
    }

    #[test]
    fn invalid_scaler_is_rejected_on_load() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let paths = write_demo_bundle(tmp.path());
        std::fs::write(
            &paths.scaler,
            r#"{"feature":"Examen_admisión_Universidad","data_min":6.0,"data_max":0.0}"#,
        )
        .expect("write");
        let err = load_bundle(&paths).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid { artifact: "scaler", .. }), "{err:?}");
    }
}
