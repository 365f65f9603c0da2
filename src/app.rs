//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves settings
//! - sets up logging
//! - loads the artifacts and builds the prediction context (fatal on failure)
//! - dispatches to the form, one-shot, batch or inspect front-end

use std::fs::File;
use std::io::{self, IsTerminal};

use clap::Parser;

use crate::cli::{BatchArgs, Command, PredictArgs};
use crate::config::Settings;
use crate::domain::Lang;
use crate::error::{AppError, EXIT_ARTIFACT, EXIT_RUNTIME};
use crate::io::{BatchColumns, load_bundle, predict_csv};

pub mod pipeline;

use pipeline::PredictionContext;

/// Entry point for the `approval` binary.
pub fn run() -> Result<(), AppError> {
    // `approval` on its own, or with only global flags, opens the form.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::resolve(&cli.global);

    let interactive = matches!(cli.command, Command::Tui) && io::stdout().is_terminal();
    let _log_guard = crate::logging::init(interactive)?;
    tracing::info!(
        encoder = %settings.paths.encoder.display(),
        scaler = %settings.paths.scaler.display(),
        model = %settings.paths.model.display(),
        policy = settings.policy.display_name(),
        "starting"
    );

    let ctx = load_context(&settings)?;

    match cli.command {
        Command::Tui => crate::tui::run(&ctx, settings.lang),
        Command::Predict(args) => handle_predict(&ctx, &args, settings.lang),
        Command::Batch(args) => handle_batch(&ctx, &args),
        Command::Inspect => {
            print!("{}", crate::report::format_artifact_summary(&ctx));
            Ok(())
        }
    }
}

/// Load every artifact and validate the column layout; nothing is served on failure.
pub fn load_context(settings: &Settings) -> Result<PredictionContext, AppError> {
    let bundle = load_bundle(&settings.paths).map_err(|e| {
        tracing::error!(error = %e, "failed to load artifacts");
        AppError::from(e)
    })?;
    PredictionContext::new(bundle, settings.policy).map_err(|e| {
        tracing::error!(error = %e, "artifacts are inconsistent");
        AppError::from(e)
    })
}

fn handle_predict(ctx: &PredictionContext, args: &PredictArgs, lang: Lang) -> Result<(), AppError> {
    let prediction = ctx.predict(&args.category, args.score)?;
    if args.json {
        let json = serde_json::to_string_pretty(&prediction)
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to encode prediction: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_prediction(&prediction, lang));
    }
    Ok(())
}

fn handle_batch(ctx: &PredictionContext, args: &BatchArgs) -> Result<(), AppError> {
    let mut columns = BatchColumns::from_context(ctx);
    if let Some(c) = &args.category_column {
        columns.category = c.clone();
    }
    if let Some(c) = &args.score_column {
        columns.score = c.clone();
    }

    let input_path = match &args.input {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_input(&[&columns.category, &columns.score])?,
    };
    let input = File::open(&input_path).map_err(|e| {
        AppError::new(
            EXIT_ARTIFACT,
            format!("Failed to open '{}': {e}", input_path.display()),
        )
    })?;

    let summary = match &args.output {
        Some(path) => {
            let out = File::create(path).map_err(|e| {
                AppError::new(EXIT_ARTIFACT, format!("Failed to create '{}': {e}", path.display()))
            })?;
            predict_csv(ctx, &columns, input, out)?
        }
        None => predict_csv(ctx, &columns, input, io::stdout().lock())?,
    };

    eprintln!(
        "{} row(s): {} approve, {} not approve, {} rejected",
        summary.rows,
        summary.approved,
        summary.not_approved,
        summary.errors.len()
    );
    for err in &summary.errors {
        eprintln!("  line {}: {}", err.line, err.message);
    }
    Ok(())
}

/// Rewrite argv so `approval` defaults to `approval tui`.
///
/// Rules:
/// - `approval`                        -> `approval tui`
/// - `approval --lang es ...`          -> `approval tui --lang es ...`
/// - `approval --help/--version/-h`    -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = argv[1..]
        .iter()
        .any(|a| matches!(a.as_str(), "tui" | "predict" | "batch" | "inspect"));
    if !has_subcommand && arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactPaths;
    use crate::domain::OutOfRangePolicy;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_form() {
        assert_eq!(rewrite_args(args(&["approval"])), args(&["approval", "tui"]));
        assert_eq!(
            rewrite_args(args(&["approval", "--lang", "es"])),
            args(&["approval", "tui", "--lang", "es"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        let argv = args(&["approval", "--artifacts", "dir", "predict", "-c", "visual", "-s", "5"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        assert_eq!(rewrite_args(args(&["approval", "--help"])), args(&["approval", "--help"]));
    }

    #[test]
    fn parsed_cli_accepts_global_flags_after_subcommand() {
        let cli = crate::cli::Cli::parse_from(args(&[
            "approval", "predict", "-c", "visual", "-s", "5.0", "--out-of-range", "clamp",
        ]));
        assert_eq!(cli.global.out_of_range, OutOfRangePolicy::Clamp);
        match cli.command {
            Command::Predict(p) => {
                assert_eq!(p.category, "visual");
                assert_eq!(p.score, 5.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_artifact_halts_before_serving() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let settings = Settings {
            paths: ArtifactPaths::in_dir(tmp.path()),
            policy: OutOfRangePolicy::Reject,
            lang: Lang::En,
        };
        let err = load_context(&settings).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_ARTIFACT);
        assert!(err.to_string().contains("encoder.json"));
    }

    #[test]
    fn complete_bundle_builds_context() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let settings = Settings {
            paths: crate::testutil::write_demo_bundle(tmp.path()),
            policy: OutOfRangePolicy::Reject,
            lang: Lang::En,
        };
        let ctx = load_context(&settings).unwrap();
        assert_eq!(ctx.categories().len(), 8);
        assert_eq!(ctx.score_domain(), (0.0, 6.0));
    }
}
