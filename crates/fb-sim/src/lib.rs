//! fb-sim: transient response simulation for segmented beams.
//!
//! Provides:
//! - Adaptive Dormand-Prince 5(4) integration with dense output
//! - Time-dependent forcing (rectangular impulse pulses)
//! - First-order system adapter for the assembled beam model
//! - Shape reconstruction back onto the beam geometry
//! - One-call response runner on a fixed report grid

pub mod dopri5;
pub mod error;
pub mod forcing;
pub mod shape;
pub mod sim;
pub mod system;

// Re-exports for public API
pub use dopri5::{Dopri5, Solution, SolverStats, Tolerance};
pub use error::{SimError, SimResult};
pub use forcing::{Forcing, ImpulseForce};
pub use shape::ShapeReconstructor;
pub use sim::{BeamResponse, SimOptions, run_response};
pub use system::{DynamicSystem, ForcedBeam};
