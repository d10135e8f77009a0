//! Adaptive Dormand-Prince 5(4) integrator with dense output.
//!
//! Explicit embedded Runge-Kutta pair: the fifth-order solution propagates,
//! the fourth-order one prices the step. The last stage of an accepted step
//! is the first stage of the next (FSAL), so an accepted step costs six
//! fresh derivative evaluations. Report samples never constrain the step
//! size; they are read off a quartic interpolant over each accepted step.

use fb_core::ensure_finite;
use nalgebra::DVector;
use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::system::DynamicSystem;

// Stage nodes.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

// Coupling coefficients.
const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights; the propagated solution is also stage 7.
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// Embedded error weights (5th-order minus 4th-order solution).
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Dense-output coefficients for the quartic interpolant.
const D1: f64 = -12715105075.0 / 11282082432.0;
const D3: f64 = 87487479700.0 / 32700410799.0;
const D4: f64 = -10690763975.0 / 1880347072.0;
const D5: f64 = 701980252875.0 / 199316789632.0;
const D6: f64 = -1453857185.0 / 822651844.0;
const D7: f64 = 69997945.0 / 29380423.0;

// Step controller.
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const INV_ORDER: f64 = 1.0 / 5.0;

/// Mixed tolerance for the weighted error norm:
/// `scale_i = abs + rel * |x_i|`.
#[derive(Clone, Copy, Debug)]
pub struct Tolerance {
    pub rel: f64,
    pub abs: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rel: 1e-3,
            abs: 1e-6,
        }
    }
}

/// Solver effort counters. A step is one attempt; rejected attempts retry
/// the same window with a smaller size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub steps: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evals: usize,
}

/// Solution sampled on the caller's report grid.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Report times [s].
    pub t: Vec<f64>,
    /// State snapshots at the report times.
    pub x: Vec<DVector<f64>>,
    pub stats: SolverStats,
}

/// Dormand-Prince 5(4) driver.
#[derive(Clone, Copy, Debug)]
pub struct Dopri5 {
    pub tol: Tolerance,
    /// Maximum number of attempted steps (safety limit).
    pub max_steps: usize,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            tol: Tolerance::default(),
            max_steps: 100_000,
        }
    }
}

impl Dopri5 {
    /// Integrate `system` from `t0` to `t_end`, sampling the solution at the
    /// `report` times (sorted, within `[t0, t_end]`).
    pub fn solve<S: DynamicSystem>(
        &self,
        system: &mut S,
        x0: DVector<f64>,
        t0: f64,
        t_end: f64,
        report: &[f64],
    ) -> SimResult<Solution> {
        self.validate(t0, t_end, report)?;
        if x0.is_empty() {
            return Err(SimError::InvalidArg {
                what: "state must be non-empty",
            });
        }
        if x0.len() != system.dim() {
            return Err(SimError::ConfigMismatch {
                what: "initial state length",
                expected: system.dim(),
                actual: x0.len(),
            });
        }
        for &v in x0.iter() {
            ensure_finite(v, "initial state")?;
        }

        let mut stats = SolverStats::default();
        let mut t = t0;
        let mut x = x0;
        let mut k1 = system.rhs(t, &x)?;
        stats.rhs_evals += 1;

        let mut h = self.initial_step(system, t, &x, &k1, t_end, &mut stats)?;
        if !h.is_finite() || h <= 0.0 {
            return Err(SimError::IntegrationFailed {
                t_reached: t,
                what: "initial step selection failed",
            });
        }

        let mut out_t = Vec::with_capacity(report.len());
        let mut out_x = Vec::with_capacity(report.len());
        let mut next_report = 0;
        while next_report < report.len() && report[next_report] <= t {
            out_t.push(report[next_report]);
            out_x.push(x.clone());
            next_report += 1;
        }

        let mut facmax = MAX_FACTOR;
        while t < t_end {
            if stats.steps >= self.max_steps {
                return Err(SimError::IntegrationFailed {
                    t_reached: t,
                    what: "maximum step count exceeded",
                });
            }
            let last = t + h >= t_end;
            let h_step = if last { t_end - t } else { h };
            if !last && h_step < 10.0 * f64::EPSILON * t.abs().max(1.0) {
                return Err(SimError::IntegrationFailed {
                    t_reached: t,
                    what: "step size underflow",
                });
            }
            stats.steps += 1;

            // Stages 2-6; stage 1 carries over from the previous step.
            let k2 = system.rhs(t + C2 * h_step, &(&x + h_step * (A21 * &k1)))?;
            let k3 = system.rhs(t + C3 * h_step, &(&x + h_step * (A31 * &k1 + A32 * &k2)))?;
            let k4 = system.rhs(
                t + C4 * h_step,
                &(&x + h_step * (A41 * &k1 + A42 * &k2 + A43 * &k3)),
            )?;
            let k5 = system.rhs(
                t + C5 * h_step,
                &(&x + h_step * (A51 * &k1 + A52 * &k2 + A53 * &k3 + A54 * &k4)),
            )?;
            let k6 = system.rhs(
                t + h_step,
                &(&x + h_step * (A61 * &k1 + A62 * &k2 + A63 * &k3 + A64 * &k4 + A65 * &k5)),
            )?;
            let x_new = &x + h_step * (A71 * &k1 + A73 * &k3 + A74 * &k4 + A75 * &k5 + A76 * &k6);
            let k7 = system.rhs(t + h_step, &x_new)?;
            stats.rhs_evals += 6;

            let err_vec =
                h_step * (E1 * &k1 + E3 * &k3 + E4 * &k4 + E5 * &k5 + E6 * &k6 + E7 * &k7);
            let err = self.error_norm(&err_vec, &x, &x_new);

            // A non-finite norm lands here too and shrinks at the floor rate.
            if !(err <= 1.0) {
                stats.rejected += 1;
                let shrink = if err.is_finite() {
                    (SAFETY * err.powf(-INV_ORDER)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                h = h_step * shrink;
                facmax = 1.0;
                trace!(t, h, err, "step rejected");
                continue;
            }

            stats.accepted += 1;
            let t_new = if last { t_end } else { t + h_step };

            if next_report < report.len() && report[next_report] <= t_new {
                let dense =
                    DenseSegment::new(&x, &x_new, h_step, [&k1, &k3, &k4, &k5, &k6, &k7]);
                while next_report < report.len() && report[next_report] <= t_new {
                    let ts = report[next_report];
                    out_t.push(ts);
                    out_x.push(dense.eval((ts - t) / h_step));
                    next_report += 1;
                }
            }

            let grow = (SAFETY * err.powf(-INV_ORDER)).min(facmax).max(MIN_FACTOR);
            h = h_step * grow;
            facmax = MAX_FACTOR;
            t = t_new;
            x = x_new;
            k1 = k7;
            trace!(t, h, err, "step accepted");
        }

        debug!(
            steps = stats.steps,
            accepted = stats.accepted,
            rejected = stats.rejected,
            rhs_evals = stats.rhs_evals,
            "integration finished"
        );

        Ok(Solution {
            t: out_t,
            x: out_x,
            stats,
        })
    }

    fn validate(&self, t0: f64, t_end: f64, report: &[f64]) -> SimResult<()> {
        if !t0.is_finite() || !t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "integration window must be finite",
            });
        }
        if t_end <= t0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be greater than t0",
            });
        }
        if !self.tol.rel.is_finite() || self.tol.rel <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "relative tolerance must be positive and finite",
            });
        }
        if !self.tol.abs.is_finite() || self.tol.abs <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "absolute tolerance must be positive and finite",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if report.iter().any(|ts| !ts.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "report times must be finite",
            });
        }
        if report.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimError::InvalidArg {
                what: "report times must be non-decreasing",
            });
        }
        if let (Some(&first), Some(&last)) = (report.first(), report.last()) {
            if first < t0 || last > t_end {
                return Err(SimError::InvalidArg {
                    what: "report times must lie within the integration window",
                });
            }
        }
        Ok(())
    }

    /// Weighted RMS error norm; the step is acceptable when this is <= 1.
    fn error_norm(&self, err: &DVector<f64>, x0: &DVector<f64>, x1: &DVector<f64>) -> f64 {
        let mut acc = 0.0;
        for i in 0..err.len() {
            let scale = self.tol.abs + self.tol.rel * x0[i].abs().max(x1[i].abs());
            let r = err[i] / scale;
            acc += r * r;
        }
        (acc / err.len() as f64).sqrt()
    }

    fn scaled_rms(&self, v: &DVector<f64>, y: &DVector<f64>) -> f64 {
        let mut acc = 0.0;
        for i in 0..v.len() {
            let scale = self.tol.abs + self.tol.rel * y[i].abs();
            let r = v[i] / scale;
            acc += r * r;
        }
        (acc / v.len() as f64).sqrt()
    }

    /// First trial step from the local derivative magnitude, refined by one
    /// cheap Euler probe.
    fn initial_step<S: DynamicSystem>(
        &self,
        system: &mut S,
        t0: f64,
        x0: &DVector<f64>,
        f0: &DVector<f64>,
        t_end: f64,
        stats: &mut SolverStats,
    ) -> SimResult<f64> {
        let span = t_end - t0;
        let d0 = self.scaled_rms(x0, x0);
        let d1 = self.scaled_rms(f0, x0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        let x1 = x0 + h0 * f0;
        let f1 = system.rhs(t0 + h0, &x1)?;
        stats.rhs_evals += 1;
        let d2 = self.scaled_rms(&(&f1 - f0), x0) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(INV_ORDER)
        };
        Ok(h1.min(100.0 * h0).min(span))
    }
}

/// Quartic interpolant over one accepted step.
struct DenseSegment {
    r1: DVector<f64>,
    r2: DVector<f64>,
    r3: DVector<f64>,
    r4: DVector<f64>,
    r5: DVector<f64>,
}

impl DenseSegment {
    /// `k = [k1, k3, k4, k5, k6, k7]`; stage 2 never enters the interpolant.
    fn new(x0: &DVector<f64>, x1: &DVector<f64>, h: f64, k: [&DVector<f64>; 6]) -> Self {
        let ydiff = x1 - x0;
        let bspl = h * k[0] - &ydiff;
        let r4 = &ydiff - h * k[5] - &bspl;
        let r5 = h * (D1 * k[0] + D3 * k[1] + D4 * k[2] + D5 * k[3] + D6 * k[4] + D7 * k[5]);
        Self {
            r1: x0.clone(),
            r2: ydiff,
            r3: bspl,
            r4,
            r5,
        }
    }

    /// Evaluate at `theta` in [0, 1]; `theta = 1` reproduces the step's end
    /// state exactly.
    fn eval(&self, theta: f64) -> DVector<f64> {
        let theta1 = 1.0 - theta;
        &self.r1
            + theta * (&self.r2 + theta1 * (&self.r3 + theta * (&self.r4 + theta1 * &self.r5)))
    }
}
