//! Command-line parsing for the course approval predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the preprocessing and model code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Lang, OutOfRangePolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "approval", version, about = "Course approval predictor (learning style + admission exam)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Directory holding encoder.json, scaler.json and model.json [env: APPROVAL_ARTIFACTS].
    #[arg(long, global = true, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Override the encoder artifact path.
    #[arg(long, global = true, value_name = "JSON")]
    pub encoder: Option<PathBuf>,

    /// Override the scaler artifact path.
    #[arg(long, global = true, value_name = "JSON")]
    pub scaler: Option<PathBuf>,

    /// Override the model artifact path.
    #[arg(long, global = true, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// How to treat scores outside the scaler's fitted domain.
    #[arg(long, global = true, value_enum, default_value_t = OutOfRangePolicy::Reject)]
    pub out_of_range: OutOfRangePolicy,

    /// UI language [env: APPROVAL_LANG].
    #[arg(long, global = true, value_enum)]
    pub lang: Option<Lang>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive prediction form.
    Tui,
    /// Predict a single submission and print the result.
    Predict(PredictArgs),
    /// Predict every row of a CSV file and write the results.
    Batch(BatchArgs),
    /// Print the loaded artifacts: categories, score domain, column order, model structure.
    Inspect,
}

/// Options for a one-shot prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Learning style category (one of the encoder's known categories).
    #[arg(short = 'c', long)]
    pub category: String,

    /// Admission exam score.
    #[arg(short = 's', long, allow_negative_numbers = true)]
    pub score: f64,

    /// Print the full prediction as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Options for batch prediction.
#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    /// Input CSV. Prompts for a file under the current directory when omitted.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Output CSV (defaults to stdout).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Category column name (defaults to the encoder's feature name).
    #[arg(long)]
    pub category_column: Option<String>,

    /// Score column name (defaults to the scaler's feature name).
    #[arg(long)]
    pub score_column: Option<String>,
}
