//! Physical shape reconstruction from reduced states.

use fb_model::SegmentTable;
use nalgebra::DVector;

use crate::error::{SimError, SimResult};

/// Maps a reduced state vector back onto the beam geometry: node `k + 1`
/// sits at the cumulative segment length and deflects by state `k`; the
/// clamped root is pinned at the origin.
#[derive(Clone, Debug)]
pub struct ShapeReconstructor {
    x_m: Vec<f64>,
    n_states: usize,
}

impl ShapeReconstructor {
    pub fn new(table: &SegmentTable) -> Self {
        let mut x_m = Vec::with_capacity(table.n_segments() + 1);
        let mut x = 0.0;
        x_m.push(x);
        for seg in table.segments() {
            x += seg.length_m;
            x_m.push(x);
        }
        Self {
            x_m,
            n_states: table.n_segments(),
        }
    }

    /// Node count, clamped root included.
    pub fn n_points(&self) -> usize {
        self.x_m.len()
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Node x positions, root first [m].
    pub fn x_m(&self) -> &[f64] {
        &self.x_m
    }

    /// Deflection of every node for one state snapshot `[q; v]`. Fails when
    /// the snapshot was produced by a model with a different node count.
    pub fn shape(&self, state: &DVector<f64>) -> SimResult<Vec<f64>> {
        if state.len() != 2 * self.n_states {
            return Err(SimError::ConfigMismatch {
                what: "state length vs reconstruction nodes",
                expected: 2 * self.n_states,
                actual: state.len(),
            });
        }
        let mut y = Vec::with_capacity(self.n_states + 1);
        y.push(0.0);
        for k in 0..self.n_states {
            y.push(state[k]);
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use fb_model::{BoundaryCondition, ElementKind, SegmentParams, SegmentTable};

    use super::*;

    fn table(n: usize) -> SegmentTable {
        SegmentTable::uniform(
            n,
            SegmentParams {
                length_m: 0.25,
                elastic_modulus_pa: 75.0e9,
                moment_inertia_m4: 4.9e-10,
                density_kg_m3: 6450.0,
                cross_area_m2: 7.85e-5,
                element: ElementKind::Linear,
                boundary: BoundaryCondition::None,
            },
        )
        .unwrap()
    }

    #[test]
    fn node_positions_accumulate_segment_lengths() {
        let recon = ShapeReconstructor::new(&table(6));
        assert_eq!(recon.n_points(), 7);
        for (k, &x) in recon.x_m().iter().enumerate() {
            assert!((x - 0.25 * k as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn root_is_pinned_and_states_shift_by_one_node() {
        let recon = ShapeReconstructor::new(&table(3));
        let mut state = DVector::zeros(6);
        state[0] = 0.1;
        state[1] = 0.2;
        state[2] = 0.3;
        // Velocity half is ignored by the shape.
        state[4] = 9.9;

        let y = recon.shape(&state).unwrap();
        assert_eq!(y, vec![0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn wrong_state_width_is_a_config_mismatch() {
        let recon = ShapeReconstructor::new(&table(6));
        let err = recon.shape(&DVector::zeros(10)).unwrap_err();
        assert!(matches!(
            err,
            SimError::ConfigMismatch {
                expected: 12,
                actual: 10,
                ..
            }
        ));
    }
}
