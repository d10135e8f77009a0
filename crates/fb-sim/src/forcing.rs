//! Time-dependent nodal loads.

use fb_core::ensure_finite;
use nalgebra::DVector;

use crate::error::{SimError, SimResult};

/// Load applied to the reduced coordinates (one entry per free node).
pub trait Forcing {
    /// Write the nodal load at time `t` into `u` [N].
    fn force(&self, t: f64, u: &mut DVector<f64>) -> SimResult<()>;
}

/// Rectangular force pulse on a single node: `magnitude_n` while
/// `t < duration_s`, zero from `duration_s` on. The window is half-open so
/// two back-to-back pulses never overlap.
#[derive(Clone, Debug)]
pub struct ImpulseForce {
    magnitude_n: f64,
    duration_s: f64,
    at_dof: usize,
}

impl ImpulseForce {
    pub fn new(magnitude_n: f64, duration_s: f64, at_dof: usize) -> SimResult<Self> {
        ensure_finite(magnitude_n, "impulse magnitude")?;
        ensure_finite(duration_s, "impulse duration")?;
        if duration_s < 0.0 {
            return Err(SimError::InvalidArg {
                what: "impulse duration must be non-negative",
            });
        }
        Ok(Self {
            magnitude_n,
            duration_s,
            at_dof,
        })
    }

    /// Pulse on the node one in from the free tip, the classic pluck used
    /// by the impulse-response scenarios. Requires at least two free nodes.
    pub fn tip_adjacent(magnitude_n: f64, duration_s: f64, n_states: usize) -> SimResult<Self> {
        if n_states < 2 {
            return Err(SimError::InvalidArg {
                what: "tip-adjacent impulse needs at least two free nodes",
            });
        }
        Self::new(magnitude_n, duration_s, n_states - 2)
    }

    pub fn at_dof(&self) -> usize {
        self.at_dof
    }
}

impl Forcing for ImpulseForce {
    fn force(&self, t: f64, u: &mut DVector<f64>) -> SimResult<()> {
        if self.at_dof >= u.len() {
            return Err(SimError::ConfigMismatch {
                what: "impulse node index",
                expected: u.len(),
                actual: self.at_dof,
            });
        }
        u.fill(0.0);
        if t < self.duration_s {
            u[self.at_dof] = self.magnitude_n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_window_is_half_open() {
        let imp = ImpulseForce::new(0.1, 0.01, 1).unwrap();
        let mut u = DVector::zeros(3);

        imp.force(0.0, &mut u).unwrap();
        assert_eq!(u[1], 0.1);
        assert_eq!(u[0], 0.0);
        assert_eq!(u[2], 0.0);

        imp.force(0.01 - 1e-12, &mut u).unwrap();
        assert_eq!(u[1], 0.1);

        imp.force(0.01, &mut u).unwrap();
        assert_eq!(u, DVector::zeros(3));

        imp.force(0.3, &mut u).unwrap();
        assert_eq!(u, DVector::zeros(3));
    }

    #[test]
    fn tip_adjacent_targets_second_to_last_state() {
        let imp = ImpulseForce::tip_adjacent(0.1, 0.01, 6).unwrap();
        assert_eq!(imp.at_dof(), 4);
    }

    #[test]
    fn tip_adjacent_needs_two_free_nodes() {
        let err = ImpulseForce::tip_adjacent(0.1, 0.01, 1).unwrap_err();
        assert!(matches!(err, SimError::InvalidArg { .. }));
    }

    #[test]
    fn out_of_range_node_is_a_config_mismatch() {
        let imp = ImpulseForce::new(1.0, 0.5, 7).unwrap();
        let mut u = DVector::zeros(3);
        let err = imp.force(0.0, &mut u).unwrap_err();
        assert!(matches!(
            err,
            SimError::ConfigMismatch {
                expected: 3,
                actual: 7,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_magnitude() {
        assert!(ImpulseForce::new(f64::NAN, 0.01, 0).is_err());
        assert!(ImpulseForce::new(0.1, -0.01, 0).is_err());
    }
}
