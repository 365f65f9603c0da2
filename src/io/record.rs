//! Prediction record writer.
//!
//! A record is a small markdown file capturing one submission end to end:
//! raw inputs, the feature row exactly as the model saw it, and the class
//! probabilities. It is the first thing to look at when a prediction seems off.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::PredictionContext;
use crate::domain::Prediction;
use crate::error::{AppError, EXIT_RUNTIME};

/// Default directory for records, relative to the working directory.
pub const RECORD_DIR: &str = "debug";

pub fn write_prediction_record(
    dir: &Path,
    ctx: &PredictionContext,
    prediction: &Prediction,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create record dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S%3f");
    let path = dir.join(format!("prediction_{ts}.md"));
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create record file: {e}")))?;

    write_record(&mut file, ctx, prediction)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write record: {e}")))?;
    tracing::info!(path = %path.display(), "prediction record written");
    Ok(path)
}

fn write_record(w: &mut impl Write, ctx: &PredictionContext, p: &Prediction) -> std::io::Result<()> {
    let (lo, hi) = ctx.score_domain();
    writeln!(w, "# prediction record")?;
    writeln!(w, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(w, "- category: {}", p.category)?;
    writeln!(w, "- score: {} (domain [{lo}, {hi}], policy {})", p.score, ctx.policy().display_name())?;
    writeln!(w, "- scaled_score: {:.6}{}", p.scaled_score, if p.clamped { " (clamped)" } else { "" })?;
    writeln!(w, "- label: {} (approved: {})", p.label, p.approved)?;

    writeln!(w, "\n## Feature row (model order)")?;
    writeln!(w, "| # | column | value |")?;
    writeln!(w, "| - | - | - |")?;
    for (i, f) in p.row.features.iter().enumerate() {
        writeln!(w, "| {i} | {} | {:.6} |", f.name, f.value)?;
    }

    writeln!(w, "\n## Class probabilities")?;
    writeln!(w, "| class | probability |")?;
    writeln!(w, "| - | - |")?;
    for c in &p.probabilities {
        writeln!(w, "| {} | {:.6} |", c.class, c.probability)?;
    }
    Ok(())
}
