//! `course-approval` library crate.
//!
//! The binary (`approval`) is a thin wrapper around this library so that:
//!
//! - the prediction handler is testable without spawning processes
//! - the form, one-shot and batch front-ends share one code path
//!
//! Data flow: artifacts (`io`) are validated into a
//! [`app::pipeline::PredictionContext`], which encodes (`preprocess`) a raw
//! submission into the model's column order and scores it (`models`).

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod preprocess;
pub mod report;
pub mod tui;

#[cfg(test)]
mod testutil;
