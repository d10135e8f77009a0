//! Euler-Bernoulli beam element matrices.
//!
//! Each element spans one segment and carries two nodes with two DOFs per
//! node, ordered `[w_i, theta_i, w_j, theta_j]` (transverse deflection and
//! slope). Stiffness uses the standard Hermite-cubic shape functions; mass
//! is the consistent formulation, not lumped.

use nalgebra::Matrix4;

use crate::params::SegmentParams;

/// 4x4 element stiffness matrix [N/m, N, N*m mixed per DOF pairing].
pub fn stiffness(seg: &SegmentParams) -> Matrix4<f64> {
    let l = seg.length_m;
    let ei = seg.elastic_modulus_pa * seg.moment_inertia_m4;
    let c = ei / (l * l * l);
    #[rustfmt::skip]
    let k = Matrix4::new(
         12.0,      6.0 * l,      -12.0,      6.0 * l,
        6.0 * l,  4.0 * l * l,  -6.0 * l,  2.0 * l * l,
        -12.0,     -6.0 * l,       12.0,     -6.0 * l,
        6.0 * l,  2.0 * l * l,  -6.0 * l,  4.0 * l * l,
    );
    c * k
}

/// 4x4 consistent mass matrix [kg mixed per DOF pairing].
pub fn consistent_mass(seg: &SegmentParams) -> Matrix4<f64> {
    let l = seg.length_m;
    let c = seg.density_kg_m3 * seg.cross_area_m2 * l / 420.0;
    #[rustfmt::skip]
    let m = Matrix4::new(
         156.0,      22.0 * l,       54.0,     -13.0 * l,
        22.0 * l,  4.0 * l * l,   13.0 * l, -3.0 * l * l,
          54.0,      13.0 * l,      156.0,     -22.0 * l,
       -13.0 * l, -3.0 * l * l,  -22.0 * l,  4.0 * l * l,
    );
    c * m
}

/// Second moment of area of a solid circular section [m^4].
pub fn circle_moment_of_inertia(radius_m: f64) -> f64 {
    std::f64::consts::PI * radius_m.powi(4) / 4.0
}

/// Area of a solid circular section [m^2].
pub fn circle_area(radius_m: f64) -> f64 {
    std::f64::consts::PI * radius_m * radius_m
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector4;

    use super::*;
    use crate::params::{BoundaryCondition, ElementKind};

    fn seg() -> SegmentParams {
        SegmentParams {
            length_m: 0.25,
            elastic_modulus_pa: 75.0e9,
            moment_inertia_m4: circle_moment_of_inertia(0.005),
            density_kg_m3: 6450.0,
            cross_area_m2: circle_area(0.005),
            element: ElementKind::Linear,
            boundary: BoundaryCondition::None,
        }
    }

    #[test]
    fn matrices_are_symmetric() {
        let k = stiffness(&seg());
        let m = consistent_mass(&seg());
        assert!((k - k.transpose()).norm() < 1e-9 * k.norm());
        assert!((m - m.transpose()).norm() < 1e-12 * m.norm());
    }

    #[test]
    fn stiffness_annihilates_rigid_body_modes() {
        let s = seg();
        let k = stiffness(&s);
        let l = s.length_m;
        // Uniform translation and rotation about node i cost no strain energy.
        let translation = Vector4::new(1.0, 0.0, 1.0, 0.0);
        let rotation = Vector4::new(0.0, 1.0, l, 1.0);
        assert!((k * translation).norm() < 1e-6 * k.norm());
        assert!((k * rotation).norm() < 1e-6 * k.norm());
    }

    #[test]
    fn consistent_mass_conserves_total_mass() {
        let s = seg();
        let m = consistent_mass(&s);
        let translation = Vector4::new(1.0, 0.0, 1.0, 0.0);
        let total = (translation.transpose() * m * translation)[(0, 0)];
        let expected = s.density_kg_m3 * s.cross_area_m2 * s.length_m;
        assert!((total - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn circle_section_helpers() {
        let r: f64 = 0.005;
        assert!((circle_moment_of_inertia(r) - 4.908738521234052e-10).abs() < 1e-24);
        assert!((circle_area(r) - 7.853981633974483e-5).abs() < 1e-18);
    }
}
