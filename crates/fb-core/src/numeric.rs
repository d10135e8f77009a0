use crate::FbError;

/// Floating point type used throughout the workspace.
pub type Real = f64;

/// One tolerance pair for everything.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FbError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FbError::NonFinite { what, value: v })
    }
}

/// Largest number of points a sampling grid may hold.
const MAX_GRID_POINTS: usize = 10_000_000;

/// Build the half-open sampling grid `t0, t0 + dt, t0 + 2*dt, ...`
/// containing every point strictly less than `t_end`.
///
/// Points are computed as `t0 + k * dt` (multiplication, not accumulation)
/// so the grid is an exact arithmetic progression with no drift; `t_end`
/// itself is never included even when `k * dt` lands on it exactly.
pub fn sample_grid(t0: Real, t_end: Real, dt: Real) -> Result<Vec<Real>, FbError> {
    ensure_finite(t0, "grid start")?;
    ensure_finite(t_end, "grid end")?;
    ensure_finite(dt, "grid step")?;
    if dt <= 0.0 {
        return Err(FbError::InvalidArg {
            what: "grid step must be positive",
        });
    }
    if t_end <= t0 {
        return Err(FbError::InvalidArg {
            what: "grid end must be greater than grid start",
        });
    }
    if (t_end - t0) / dt > MAX_GRID_POINTS as Real {
        return Err(FbError::InvalidArg {
            what: "sampling grid would exceed the supported size",
        });
    }

    let mut grid = Vec::new();
    for k in 0.. {
        let t = t0 + k as Real * dt;
        if t >= t_end {
            break;
        }
        grid.push(t);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn grid_is_half_open() {
        // 0.5 / 0.01 -> exactly 50 points, 0.00 through 0.49.
        let grid = sample_grid(0.0, 0.5, 0.01).unwrap();
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert!(*grid.last().unwrap() < 0.5);
        assert!((grid[49] - 0.49).abs() < 1e-12);
    }

    #[test]
    fn grid_excludes_exact_endpoint() {
        let grid = sample_grid(0.0, 1.0, 0.25).unwrap();
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn grid_rejects_bad_arguments() {
        assert!(sample_grid(0.0, 1.0, 0.0).is_err());
        assert!(sample_grid(0.0, 1.0, -0.1).is_err());
        assert!(sample_grid(1.0, 1.0, 0.1).is_err());
        assert!(sample_grid(0.0, Real::NAN, 0.1).is_err());
    }

    proptest! {
        #[test]
        fn grid_properties(
            t0 in -10.0f64..10.0,
            span in 1e-3f64..100.0,
            dt in 1e-3f64..1.0,
        ) {
            let t_end = t0 + span;
            let grid = sample_grid(t0, t_end, dt).unwrap();
            let tol = Tolerances::default();

            prop_assert!(!grid.is_empty());
            prop_assert_eq!(grid[0], t0);
            for pair in grid.windows(2) {
                prop_assert!(pair[1] > pair[0]);
                prop_assert!(nearly_equal(pair[1] - pair[0], dt, tol));
            }
            for &t in &grid {
                prop_assert!(t < t_end);
            }
            // The next point past the last one would leave the window.
            let next = t0 + grid.len() as f64 * dt;
            prop_assert!(next >= t_end);
        }
    }
}
