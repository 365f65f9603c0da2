//! Error types.
//!
//! Two layers:
//!
//! - typed errors for the prediction core (`InputError`, `ArtifactError`, `PredictError`)
//!   so callers can tell a bad submission apart from a broken artifact
//! - `AppError`, the binary boundary type: a message plus the process exit code

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for artifact, configuration and file I/O failures.
pub const EXIT_ARTIFACT: u8 = 2;
/// Exit code for a rejected one-shot submission.
pub const EXIT_INPUT: u8 = 3;
/// Exit code for terminal and other runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

/// A submission the handler refuses to score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Unsupported category '{category}'. Known categories: {}", known.join(", "))]
    UnsupportedCategory { category: String, known: Vec<String> },

    #[error("Score {value} is outside the fitted domain [{min}, {max}].")]
    ScoreOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Score must be a finite number (got {0}).")]
    NonFiniteScore(f64),
}

/// A problem with one of the loaded artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read artifact '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {artifact} artifact: {message}")]
    Invalid { artifact: &'static str, message: String },

    #[error("Model columns do not match preprocessing output (missing: [{}], unexpected: [{}]).", missing.join(", "), unexpected.join(", "))]
    ColumnMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Corrupt model state: {0}")]
    Corrupt(String),
}

impl ArtifactError {
    pub fn invalid(artifact: &'static str, message: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            artifact,
            message: message.into(),
        }
    }
}

/// Failure of a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl PredictError {
    /// True when the caller supplied something the model cannot score.
    pub fn is_input(&self) -> bool {
        matches!(self, PredictError::Input(_))
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        AppError::new(EXIT_ARTIFACT, err.to_string())
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Input(e) => e.into(),
            PredictError::Artifact(e) => e.into(),
        }
    }
}
