//! fb-core: stable foundation for flexbeam.
//!
//! Contains:
//! - numeric (float helpers + comparison tolerances + sampling grids)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FbError, FbResult};
pub use numeric::*;
