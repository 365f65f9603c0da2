//! Input/output helpers.
//!
//! - artifact JSON loading (`artifacts`)
//! - CSV batch prediction (`batch`)
//! - prediction records written from the form (`record`)

pub mod artifacts;
pub mod batch;
pub mod record;

pub use artifacts::*;
pub use batch::*;
pub use record::*;
