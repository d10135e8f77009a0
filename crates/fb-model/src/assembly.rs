//! Global assembly and reduction to one transverse DOF per free node.
//!
//! The full system carries `[w, theta]` at every node. After clamping the
//! anchored node we condense the slope DOFs onto the deflections (Guyan
//! reduction, exact for static load paths), so the reduced system has
//! exactly `n_segments` states and reconstruction can map state `k` to
//! node `k + 1` without bookkeeping.

use nalgebra::DMatrix;

use crate::element;
use crate::error::{ModelError, ModelResult};
use crate::params::{BoundaryCondition, SegmentTable};

pub(crate) struct ReducedSystem {
    pub mass: DMatrix<f64>,
    pub stiffness: DMatrix<f64>,
}

/// Assemble the clamped beam and condense rotations away.
pub(crate) fn reduce(table: &SegmentTable) -> ModelResult<ReducedSystem> {
    let (k_full, m_full) = assemble_full(table);
    let dim = k_full.nrows();

    let clamped: Vec<usize> = table
        .segments()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.boundary == BoundaryCondition::Fixed)
        .map(|(i, _)| i)
        .collect();
    let free: Vec<usize> = (0..dim).filter(|d| !clamped.contains(&(d / 2))).collect();

    // Split the free DOFs into translational masters and rotational slaves.
    let masters: Vec<usize> = free.iter().copied().filter(|d| d % 2 == 0).collect();
    let slaves: Vec<usize> = free.iter().copied().filter(|d| d % 2 == 1).collect();

    let k_tt = gather(&k_full, &masters, &masters);
    let k_tr = gather(&k_full, &masters, &slaves);
    let k_rt = gather(&k_full, &slaves, &masters);
    let k_rr = gather(&k_full, &slaves, &slaves);
    let m_tt = gather(&m_full, &masters, &masters);
    let m_tr = gather(&m_full, &masters, &slaves);
    let m_rt = gather(&m_full, &slaves, &masters);
    let m_rr = gather(&m_full, &slaves, &slaves);

    // Static condensation: slaves follow masters through s = -K_rr^-1 K_rt.
    let x = k_rr.lu().solve(&k_rt).ok_or(ModelError::Singular {
        what: "rotational stiffness block",
    })?;
    let s = -x;
    let st = s.transpose();

    let k_red = &k_tt + &k_tr * &s;
    let m_red = &m_tt + &m_tr * &s + &st * &m_rt + &st * (&m_rr * &s);

    // Symmetrize against accumulated roundoff.
    let k_red = 0.5 * (&k_red + k_red.transpose());
    let m_red = 0.5 * (&m_red + m_red.transpose());

    Ok(ReducedSystem {
        mass: m_red,
        stiffness: k_red,
    })
}

fn assemble_full(table: &SegmentTable) -> (DMatrix<f64>, DMatrix<f64>) {
    let n_nodes = table.n_segments() + 1;
    let dim = 2 * n_nodes;
    let mut k = DMatrix::zeros(dim, dim);
    let mut m = DMatrix::zeros(dim, dim);
    for (e, seg) in table.segments().iter().enumerate() {
        let ke = element::stiffness(seg);
        let me = element::consistent_mass(seg);
        let base = 2 * e;
        for a in 0..4 {
            for b in 0..4 {
                k[(base + a, base + b)] += ke[(a, b)];
                m[(base + a, base + b)] += me[(a, b)];
            }
        }
    }
    (k, m)
}

fn gather(src: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| src[(rows[i], cols[j])])
}

#[cfg(test)]
mod tests {
    use nalgebra::Cholesky;

    use super::*;
    use crate::element::{circle_area, circle_moment_of_inertia};
    use crate::params::{ElementKind, SegmentParams};

    fn table(n: usize) -> SegmentTable {
        SegmentTable::uniform(
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
        .unwrap()
    }

    #[test]
    fn reduced_dimension_is_one_per_segment() {
        let sys = reduce(&table(6)).unwrap();
        assert_eq!(sys.mass.nrows(), 6);
        assert_eq!(sys.mass.ncols(), 6);
        assert_eq!(sys.stiffness.nrows(), 6);
    }

    #[test]
    fn reduced_matrices_are_symmetric_positive_definite() {
        let sys = reduce(&table(4)).unwrap();
        assert!((&sys.mass - sys.mass.transpose()).norm() < 1e-9 * sys.mass.norm());
        assert!(
            (&sys.stiffness - sys.stiffness.transpose()).norm() < 1e-9 * sys.stiffness.norm()
        );
        assert!(Cholesky::new(sys.mass).is_some());
        assert!(Cholesky::new(sys.stiffness).is_some());
    }

    #[test]
    fn single_segment_reduces_to_scalar_system() {
        let sys = reduce(&table(1)).unwrap();
        assert_eq!(sys.mass.nrows(), 1);
        assert!(sys.mass[(0, 0)] > 0.0);
        assert!(sys.stiffness[(0, 0)] > 0.0);
    }
}
