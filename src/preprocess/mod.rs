//! Preprocessing transformers fitted at training time.
//!
//! Both are pure, stateless-after-load value types: the handler holds one of
//! each for the life of the process.

pub mod encoder;
pub mod scaler;

pub use encoder::*;
pub use scaler::*;
