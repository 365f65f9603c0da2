//! Terminal formatting for predictions and artifact summaries.

use std::fmt::Write as _;

use crate::app::pipeline::PredictionContext;
use crate::domain::{Lang, Prediction};
use crate::report::texts;

/// One-shot prediction text, as printed by `approval predict`.
pub fn format_prediction(prediction: &Prediction, lang: Lang) -> String {
    let t = texts(lang);
    let mut out = String::new();
    let _ = writeln!(out, "{}:", t.result_title);
    let _ = writeln!(
        out,
        "  {} ({} {:.1}%)",
        t.verdict(prediction.approved),
        t.confidence,
        prediction.confidence() * 100.0
    );
    let _ = writeln!(out, "  {}: {}", t.category_label, prediction.category);
    let _ = writeln!(
        out,
        "  {}: {} -> {:.4}",
        t.score_label, prediction.score, prediction.scaled_score
    );
    if prediction.clamped {
        let _ = writeln!(out, "  note: {}", t.clamped_note);
    }
    out
}

/// Feature row as aligned `name = value` lines, in model order.
pub fn format_row(prediction: &Prediction) -> String {
    let width = prediction
        .row
        .names()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for f in &prediction.row.features {
        let pad = width - f.name.chars().count();
        let _ = writeln!(out, "{}{} = {:.4}", f.name, " ".repeat(pad), f.value);
    }
    out
}

/// Human-readable summary of the loaded artifacts.
pub fn format_artifact_summary(ctx: &PredictionContext) -> String {
    let mut out = String::new();
    let encoder = ctx.encoder();
    let scaler = ctx.scaler();
    let model = ctx.model();

    let _ = writeln!(out, "Encoder: {} ({} categories)", encoder.feature, encoder.width());
    for (i, c) in encoder.categories.iter().enumerate() {
        let _ = writeln!(out, "  [{i}] {c}");
    }

    let (lo, hi) = ctx.score_domain();
    let _ = writeln!(
        out,
        "Scaler: {} domain [{lo}, {hi}] -> [{}, {}] as '{}'",
        scaler.feature,
        scaler.feature_range[0],
        scaler.feature_range[1],
        scaler.output_name()
    );
    let _ = writeln!(out, "Out-of-range policy: {}", ctx.policy().display_name());

    let _ = writeln!(out, "Column order (from model artifact):");
    for (i, name) in ctx.column_order().iter().enumerate() {
        let _ = writeln!(out, "  {i:>2}. {name}");
    }

    let _ = writeln!(
        out,
        "Classes: {} (positive: {})",
        model.classes.join(", "),
        model.positive_class
    );
    let _ = writeln!(out, "Estimator:");
    for line in model.estimator.describe() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::demo_context;

    #[test]
    fn prediction_text_is_localized() {
        let ctx = demo_context();
        let p = ctx.predict("visual", 5.0).unwrap();
        let en = format_prediction(&p, Lang::En);
        let es = format_prediction(&p, Lang::Es);
        assert!(en.contains("Approve"));
        assert!(es.contains("Aprueba"));
        assert!(es.contains("Tipo de Felder: visual"));
    }

    #[test]
    fn row_lists_every_column_in_model_order() {
        let ctx = demo_context();
        let p = ctx.predict("verbal", 2.0).unwrap();
        let text = format_row(&p);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("Examen_admisión_Universidad_scaled = 0.3333"));
        assert!(lines[7].starts_with("Felder_verbal"));
        assert!(lines[7].ends_with("1.0000"));
    }

    #[test]
    fn summary_shows_domain_and_structure() {
        let summary = format_artifact_summary(&demo_context());
        assert!(summary.contains("domain [0, 6]"));
        assert!(summary.contains("Examen_admisión_Universidad_scaled"));
        assert!(summary.contains("stacking"));
        assert!(summary.contains("tree: decision_tree"));
        assert!(summary.contains("final: logistic"));
    }
}
