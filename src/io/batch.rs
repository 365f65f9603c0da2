//! Batch prediction over a CSV file.
//!
//! Every input row yields exactly one output row. Rows that cannot be scored
//! (unknown category, unparsable or out-of-domain score) keep their line
//! number and carry the error text instead of a label; they never abort the
//! run. The same holds for rows the CSV reader cannot decode. Artifact and
//! I/O failures do abort.

use std::io::{Read, Write};

use serde::Serialize;

use crate::app::pipeline::PredictionContext;
use crate::error::{AppError, EXIT_ARTIFACT, PredictError};

/// A row-level error encountered during batch prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

/// Counts for the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub approved: usize,
    pub not_approved: usize,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    line: u64,
    category: &'a str,
    score: &'a str,
    scaled_score: Option<f64>,
    label: Option<&'a str>,
    approved: Option<bool>,
    probability: Option<f64>,
    error: Option<String>,
}

/// Which input columns hold the two raw fields.
#[derive(Debug, Clone)]
pub struct BatchColumns {
    pub category: String,
    pub score: String,
}

impl BatchColumns {
    /// Column names recorded in the artifacts.
    pub fn from_context(ctx: &PredictionContext) -> Self {
        Self {
            category: ctx.encoder().feature.clone(),
            score: ctx.scaler().feature.clone(),
        }
    }
}

/// Parse a score cell, accepting a decimal comma (`5,25`).
pub fn parse_score(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let v = s
        .parse::<f64>()
        .ok()
        .or_else(|| s.replace(',', ".").parse::<f64>().ok())?;
    v.is_finite().then_some(v)
}

/// Predict every row of `input` and write one CSV row per input row to `output`.
pub fn predict_csv<R: Read, W: Write>(
    ctx: &PredictionContext,
    columns: &BatchColumns,
    input: R,
    output: W,
) -> Result<BatchSummary, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to read CSV header: {e}")))?
        .clone();

    let find = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            AppError::new(
                EXIT_ARTIFACT,
                format!(
                    "CSV is missing column '{name}' (found: {}).",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            )
        })
    };
    let category_idx = find(&columns.category)?;
    let score_idx = find(&columns.score)?;

    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(AppError::new(EXIT_ARTIFACT, format!("Failed to read CSV row: {e}")));
            }
            Err(e) => {
                // The reader has already moved past the bad record.
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                let message = format!("Unreadable row: {e}");
                summary.rows += 1;
                summary.errors.push(RowError {
                    line,
                    message: message.clone(),
                });
                write_row(
                    &mut writer,
                    &OutputRow {
                        line,
                        category: "",
                        score: "",
                        scaled_score: None,
                        label: None,
                        approved: None,
                        probability: None,
                        error: Some(message),
                    },
                )?;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let category = record.get(category_idx).unwrap_or("");
        let raw_score = record.get(score_idx).unwrap_or("");
        summary.rows += 1;

        let result = match parse_score(raw_score) {
            Some(score) => match ctx.predict(category, score) {
                Ok(p) => Ok(p),
                Err(PredictError::Input(e)) => Err(e.to_string()),
                Err(PredictError::Artifact(e)) => return Err(e.into()),
            },
            None => Err(format!("Invalid score '{raw_score}'.")),
        };

        let row = match &result {
            Ok(p) => {
                if p.approved {
                    summary.approved += 1;
                } else {
                    summary.not_approved += 1;
                }
                OutputRow {
                    line,
                    category,
                    score: raw_score,
                    scaled_score: Some(p.scaled_score),
                    label: Some(&p.label),
                    approved: Some(p.approved),
                    probability: Some(p.confidence()),
                    error: None,
                }
            }
            Err(message) => {
                summary.errors.push(RowError {
                    line,
                    message: message.clone(),
                });
                OutputRow {
                    line,
                    category,
                    score: raw_score,
                    scaled_score: None,
                    label: None,
                    approved: None,
                    probability: None,
                    error: Some(message.clone()),
                }
            }
        };
        write_row(&mut writer, &row)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write CSV output: {e}")))?;
    tracing::info!(
        rows = summary.rows,
        approved = summary.approved,
        errors = summary.errors.len(),
        "batch complete"
    );
    Ok(summary)
}

fn write_row<W: Write>(writer: &mut csv::Writer<W>, row: &OutputRow<'_>) -> Result<(), AppError> {
    writer
        .serialize(row)
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write CSV row: {e}")))
}
