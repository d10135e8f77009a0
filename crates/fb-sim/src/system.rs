//! DynamicSystem trait for pluggable first-order systems.

use fb_model::LinearBeamModel;
use nalgebra::DVector;

use crate::error::SimResult;
use crate::forcing::Forcing;

/// Continuous-time system in first-order form, as consumed by the
/// integrators in this crate.
///
/// Note: `rhs` takes `&mut self` to allow implementations to cache work
/// between evaluations.
pub trait DynamicSystem {
    /// State dimension.
    fn dim(&self) -> usize;

    /// Compute the state derivative dx/dt = f(t, x).
    fn rhs(&mut self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>>;
}

/// A beam model driven by a time-dependent nodal load. The state is
/// `[q; v]`, twice the model's coordinate count.
pub struct ForcedBeam<'a, F: Forcing> {
    model: &'a LinearBeamModel,
    forcing: F,
    // Load buffer reused across rhs evaluations.
    u: DVector<f64>,
}

impl<'a, F: Forcing> ForcedBeam<'a, F> {
    pub fn new(model: &'a LinearBeamModel, forcing: F) -> Self {
        let u = DVector::zeros(model.n_states());
        Self { model, forcing, u }
    }
}

impl<F: Forcing> DynamicSystem for ForcedBeam<'_, F> {
    fn dim(&self) -> usize {
        2 * self.model.n_states()
    }

    fn rhs(&mut self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        self.forcing.force(t, &mut self.u)?;
        Ok(self.model.derivative(t, x, &self.u)?)
    }
}

#[cfg(test)]
mod tests {
    use fb_model::element::{circle_area, circle_moment_of_inertia};
    use fb_model::{
        BoundaryCondition, Damping, ElementKind, SegmentParams, SegmentTable,
    };

    use super::*;
    use crate::forcing::ImpulseForce;

    fn model(n: usize) -> LinearBeamModel {
        let table = SegmentTable::uniform(
            n,
            SegmentParams {
                length_m: 0.25,
                elastic_modulus_pa: 75.0e9,
                moment_inertia_m4: circle_moment_of_inertia(0.005),
                density_kg_m3: 6450.0,
                cross_area_m2: circle_area(0.005),
                element: ElementKind::Linear,
                boundary: BoundaryCondition::None,
            },
        )
        .unwrap();
        LinearBeamModel::assemble(&table, Damping::None).unwrap()
    }

    #[test]
    fn dim_is_twice_the_coordinate_count() {
        let m = model(6);
        let sys = ForcedBeam::new(&m, ImpulseForce::tip_adjacent(0.1, 0.01, 6).unwrap());
        assert_eq!(sys.dim(), 12);
    }

    #[test]
    fn rest_without_load_has_zero_derivative() {
        let m = model(4);
        let mut sys = ForcedBeam::new(&m, ImpulseForce::new(0.0, 0.01, 2).unwrap());
        let dx = sys.rhs(0.0, &m.rest_state()).unwrap();
        assert_eq!(dx, DVector::zeros(8));
    }

    #[test]
    fn load_inside_pulse_accelerates_the_target_node() {
        let m = model(4);
        let mut sys = ForcedBeam::new(&m, ImpulseForce::tip_adjacent(0.1, 0.01, 4).unwrap());
        let dx = sys.rhs(0.005, &m.rest_state()).unwrap();
        // Positions stay put, at least one node accelerates.
        assert!(dx.rows(0, 4).iter().all(|&v| v == 0.0));
        assert!(dx.rows(4, 4).norm() > 0.0);
    }
}
