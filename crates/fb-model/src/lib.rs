//! fb-model: segmented cantilever beam assembly.
//!
//! Turns a validated [`params::SegmentTable`] into a [`beam::LinearBeamModel`]:
//! Euler-Bernoulli elements per segment, clamped root, and static
//! condensation of the slope DOFs so the reduced model carries exactly one
//! transverse deflection state per free node.

pub mod beam;
pub mod element;
pub mod error;
pub mod params;

// Internal modules
mod assembly;

// Re-exports: nice ergonomics for downstream crates
pub use beam::{Damping, LinearBeamModel};
pub use error::{ModelError, ModelResult};
pub use params::{BoundaryCondition, ElementKind, SegmentParams, SegmentTable};
