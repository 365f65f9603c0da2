//! Reporting: localized text, prediction output and artifact summaries.

pub mod format;
pub mod text;

pub use format::*;
pub use text::*;
