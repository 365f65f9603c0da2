//! Runtime configuration.
//!
//! Values come from CLI flags first, then the environment (a `.env` file is
//! loaded if present), then defaults.

use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::domain::{Lang, OutOfRangePolicy};

pub const ENV_ARTIFACTS: &str = "APPROVAL_ARTIFACTS";
pub const ENV_LANG: &str = "APPROVAL_LANG";
pub const ENV_LOG_MODE: &str = "APPROVAL_LOG_MODE";
pub const ENV_LOG_FILE: &str = "APPROVAL_LOG_FILE";

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const ENCODER_FILE: &str = "encoder.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub encoder: PathBuf,
    pub scaler: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            encoder: dir.join(ENCODER_FILE),
            scaler: dir.join(SCALER_FILE),
            model: dir.join(MODEL_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.encoder, &self.scaler, &self.model]
    }
}

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: ArtifactPaths,
    pub policy: OutOfRangePolicy,
    pub lang: Lang,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Resolution with an injectable environment lookup.
    pub fn resolve_with(args: &GlobalArgs, env: impl Fn(&str) -> Option<String>) -> Self {
        let dir = args
            .artifacts
            .clone()
            .or_else(|| env(ENV_ARTIFACTS).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        let defaults = ArtifactPaths::in_dir(&dir);
        let paths = ArtifactPaths {
            encoder: args.encoder.clone().unwrap_or(defaults.encoder),
            scaler: args.scaler.clone().unwrap_or(defaults.scaler),
            model: args.model.clone().unwrap_or(defaults.model),
        };

        let lang = args
            .lang
            .or_else(|| env(ENV_LANG).and_then(|v| Lang::parse(&v)))
            .unwrap_or_default();

        Self {
            paths,
            policy: args.out_of_range,
            lang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GlobalArgs {
        GlobalArgs {
            artifacts: None,
            encoder: None,
            scaler: None,
            model: None,
            out_of_range: OutOfRangePolicy::Reject,
            lang: None,
        }
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let s = Settings::resolve_with(&args(), |_| None);
        assert_eq!(s.paths, ArtifactPaths::in_dir(Path::new("artifacts")));
        assert_eq!(s.lang, Lang::En);
    }

    #[test]
    fn env_fills_in_missing_flags() {
        let s = Settings::resolve_with(&args(), |k| match k {
            ENV_ARTIFACTS => Some("/srv/model".to_string()),
            ENV_LANG => Some("es".to_string()),
            _ => None,
        });
        assert_eq!(s.paths.model, PathBuf::from("/srv/model/model.json"));
        assert_eq!(s.lang, Lang::Es);
    }

    #[test]
    fn flags_win_over_env() {
        let mut a = args();
        a.artifacts = Some(PathBuf::from("local"));
        a.model = Some(PathBuf::from("other/best.json"));
        a.lang = Some(Lang::En);
        let s = Settings::resolve_with(&a, |k| match k {
            ENV_ARTIFACTS => Some("/srv/model".to_string()),
            ENV_LANG => Some("es".to_string()),
            _ => None,
        });
        assert_eq!(s.paths.encoder, PathBuf::from("local/encoder.json"));
        assert_eq!(s.paths.model, PathBuf::from("other/best.json"));
        assert_eq!(s.lang, Lang::En);
    }
}
