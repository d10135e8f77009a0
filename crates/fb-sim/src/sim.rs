//! Transient response runner: model + forcing -> sampled beam shapes.

use fb_core::sample_grid;
use fb_model::{LinearBeamModel, SegmentTable};
use tracing::info;

use crate::dopri5::{Dopri5, SolverStats, Tolerance};
use crate::error::{SimError, SimResult};
use crate::forcing::Forcing;
use crate::shape::ShapeReconstructor;
use crate::system::ForcedBeam;

/// Options for response runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Simulated span (seconds); the report grid is half-open at this end.
    pub t_final_s: f64,
    /// Report sampling interval (seconds)
    pub dt_report_s: f64,
    /// Relative tolerance for the adaptive integrator
    pub rel_tol: f64,
    /// Absolute tolerance for the adaptive integrator
    pub abs_tol: f64,
    /// Maximum number of attempted steps (safety limit)
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_final_s: 0.5,
            dt_report_s: 0.01,
            rel_tol: 1e-3,
            abs_tol: 1e-6,
            max_steps: 100_000,
        }
    }
}

/// Sampled transient response of the beam on the report grid.
#[derive(Clone, Debug)]
pub struct BeamResponse {
    /// Report times [s].
    pub times_s: Vec<f64>,
    /// Node x positions, root first [m].
    pub x_m: Vec<f64>,
    /// One deflection row per report time, clamped root included [m].
    pub y_m: Vec<Vec<f64>>,
    /// Tip deflection per report time [m].
    pub tip_y_m: Vec<f64>,
    /// Solver effort counters.
    pub stats: SolverStats,
}

/// Integrate the forced beam from rest and reconstruct its shape at every
/// report sample `t = k * dt_report_s < t_final_s`.
pub fn run_response<F: Forcing>(
    model: &LinearBeamModel,
    table: &SegmentTable,
    forcing: F,
    opts: &SimOptions,
) -> SimResult<BeamResponse> {
    let recon = ShapeReconstructor::new(table);
    if recon.n_states() != model.n_states() {
        return Err(SimError::ConfigMismatch {
            what: "segment table vs model coordinates",
            expected: model.n_states(),
            actual: recon.n_states(),
        });
    }

    let report = sample_grid(0.0, opts.t_final_s, opts.dt_report_s)?;
    let solver = Dopri5 {
        tol: Tolerance {
            rel: opts.rel_tol,
            abs: opts.abs_tol,
        },
        max_steps: opts.max_steps,
    };

    let mut system = ForcedBeam::new(model, forcing);
    let solution = solver.solve(&mut system, model.rest_state(), 0.0, opts.t_final_s, &report)?;

    let mut y_m = Vec::with_capacity(solution.x.len());
    let mut tip_y_m = Vec::with_capacity(solution.x.len());
    for state in &solution.x {
        let y = recon.shape(state)?;
        tip_y_m.push(*y.last().unwrap_or(&0.0));
        y_m.push(y);
    }

    info!(
        samples = solution.t.len(),
        steps = solution.stats.steps,
        t_final_s = opts.t_final_s,
        "transient response complete"
    );

    Ok(BeamResponse {
        times_s: solution.t,
        x_m: recon.x_m().to_vec(),
        y_m,
        tip_y_m,
        stats: solution.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.t_final_s, 0.5);
        assert_eq!(opts.dt_report_s, 0.01);
        assert_eq!(opts.rel_tol, 1e-3);
        assert_eq!(opts.abs_tol, 1e-6);
        assert_eq!(opts.max_steps, 100_000);
    }
}
