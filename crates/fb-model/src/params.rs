//! Segment parameter table: the validated description of the beam.
//!
//! A beam is an ordered list of segments, root to tip. Each segment carries
//! its own geometry and material so stepped or graded builds are expressed
//! the same way as uniform ones. The root segment (and only the root
//! segment) is anchored with the `FIXED` tag.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Support tag carried by a segment. `Fixed` clamps the segment's root node
/// (both deflection and slope); `None` leaves the segment unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoundaryCondition {
    Fixed,
    None,
}

/// Element formulation tag. Only the linear Euler-Bernoulli formulation is
/// implemented; the tag exists so tables that ask for anything else are
/// rejected loudly instead of silently linearized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Linear,
}

/// Physical and geometric properties of one beam segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentParams {
    /// Segment length [m].
    pub length_m: f64,
    /// Young's modulus [Pa].
    pub elastic_modulus_pa: f64,
    /// Second moment of area of the cross-section [m^4].
    pub moment_inertia_m4: f64,
    /// Material density [kg/m^3].
    pub density_kg_m3: f64,
    /// Cross-sectional area [m^2].
    pub cross_area_m2: f64,
    /// Element formulation used for this segment.
    pub element: ElementKind,
    /// Support applied at the segment's root node.
    pub boundary: BoundaryCondition,
}

impl SegmentParams {
    /// Check that every physical quantity is finite and strictly positive.
    pub fn validate(&self) -> ModelResult<()> {
        ensure_positive(self.length_m, "length_m")?;
        ensure_positive(self.elastic_modulus_pa, "elastic_modulus_pa")?;
        ensure_positive(self.moment_inertia_m4, "moment_inertia_m4")?;
        ensure_positive(self.density_kg_m3, "density_kg_m3")?;
        ensure_positive(self.cross_area_m2, "cross_area_m2")?;
        Ok(())
    }
}

fn ensure_positive(value: f64, field: &'static str) -> ModelResult<()> {
    if !value.is_finite() {
        return Err(ModelError::InvalidParameter {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(ModelError::InvalidParameter {
            field,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

/// Expected header of a segment table in CSV form.
pub const CSV_HEADER: &str =
    "length,elastic_modulus,moment_inertia,density,cross_area,type,boundary_condition";

/// Ordered, validated segment list. Construction is the validation gate:
/// a `SegmentTable` in hand is safe to assemble.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTable {
    segments: Vec<SegmentParams>,
}

impl SegmentTable {
    /// Validate and wrap a root-to-tip segment list.
    pub fn new(segments: Vec<SegmentParams>) -> ModelResult<Self> {
        if segments.is_empty() {
            return Err(ModelError::BoundaryLayout {
                what: "segment table is empty",
            });
        }
        for seg in &segments {
            seg.validate()?;
        }
        if segments[0].boundary != BoundaryCondition::Fixed {
            return Err(ModelError::BoundaryLayout {
                what: "first segment must carry the FIXED anchor",
            });
        }
        if segments[1..]
            .iter()
            .any(|s| s.boundary == BoundaryCondition::Fixed)
        {
            return Err(ModelError::BoundaryLayout {
                what: "only the first segment may carry FIXED",
            });
        }
        Ok(Self { segments })
    }

    /// Build a uniform table: `n` copies of `proto`, first segment anchored,
    /// the rest free. Boundary tags on `proto` are ignored.
    pub fn uniform(n: usize, proto: SegmentParams) -> ModelResult<Self> {
        let segments = (0..n)
            .map(|i| SegmentParams {
                boundary: if i == 0 {
                    BoundaryCondition::Fixed
                } else {
                    BoundaryCondition::None
                },
                ..proto.clone()
            })
            .collect();
        Self::new(segments)
    }

    /// Parse a table from CSV text. The header line must match
    /// [`CSV_HEADER`]; blank lines are skipped.
    pub fn from_csv_str(text: &str) -> ModelResult<Self> {
        let mut lines = text.lines().enumerate();
        let (_, header) = lines.next().ok_or_else(|| ModelError::Parse {
            line: 1,
            what: "empty segment table".to_string(),
        })?;
        if header.trim() != CSV_HEADER {
            return Err(ModelError::Parse {
                line: 1,
                what: format!("unexpected header {header:?}"),
            });
        }

        let mut segments = Vec::new();
        for (idx, raw) in lines {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 7 {
                return Err(ModelError::Parse {
                    line: line_no,
                    what: format!("expected 7 fields, got {}", fields.len()),
                });
            }
            let num = |i: usize, name: &str| -> ModelResult<f64> {
                fields[i].parse::<f64>().map_err(|_| ModelError::Parse {
                    line: line_no,
                    what: format!("{name} is not a number: {:?}", fields[i]),
                })
            };
            let element = match fields[5] {
                "linear" => ElementKind::Linear,
                other => {
                    return Err(ModelError::UnsupportedElement {
                        kind: other.to_string(),
                    });
                }
            };
            let boundary = match fields[6] {
                "FIXED" => BoundaryCondition::Fixed,
                "NONE" => BoundaryCondition::None,
                other => {
                    return Err(ModelError::Parse {
                        line: line_no,
                        what: format!("unknown boundary condition {other:?}"),
                    });
                }
            };
            segments.push(SegmentParams {
                length_m: num(0, "length")?,
                elastic_modulus_pa: num(1, "elastic_modulus")?,
                moment_inertia_m4: num(2, "moment_inertia")?,
                density_kg_m3: num(3, "density")?,
                cross_area_m2: num(4, "cross_area")?,
                element,
                boundary,
            });
        }
        Self::new(segments)
    }

    /// Parse a table from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_csv_str(&text)
    }

    pub fn segments(&self) -> &[SegmentParams] {
        &self.segments
    }

    pub fn n_segments(&self) -> usize {
        self.segments.len()
    }

    /// Total beam length, root to tip [m].
    pub fn total_length_m(&self) -> f64 {
        self.segments.iter().map(|s| s.length_m).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(boundary: BoundaryCondition) -> SegmentParams {
        SegmentParams {
            length_m: 0.25,
            elastic_modulus_pa: 75.0e9,
            moment_inertia_m4: 4.9e-10,
            density_kg_m3: 6450.0,
            cross_area_m2: 7.85e-5,
            element: ElementKind::Linear,
            boundary,
        }
    }

    #[test]
    fn accepts_valid_table() {
        let table = SegmentTable::new(vec![
            seg(BoundaryCondition::Fixed),
            seg(BoundaryCondition::None),
            seg(BoundaryCondition::None),
        ])
        .unwrap();
        assert_eq!(table.n_segments(), 3);
        assert!((table.total_length_m() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn uniform_anchors_only_the_root() {
        let table = SegmentTable::uniform(4, seg(BoundaryCondition::None)).unwrap();
        assert_eq!(table.segments()[0].boundary, BoundaryCondition::Fixed);
        assert!(table.segments()[1..]
            .iter()
            .all(|s| s.boundary == BoundaryCondition::None));
    }

    #[test]
    fn rejects_nonpositive_length() {
        let mut bad = seg(BoundaryCondition::Fixed);
        bad.length_m = 0.0;
        let err = SegmentTable::new(vec![bad]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidParameter {
                field: "length_m",
                ..
            }
        ));
    }

    #[test]
    fn rejects_nan_modulus() {
        let mut bad = seg(BoundaryCondition::Fixed);
        bad.elastic_modulus_pa = f64::NAN;
        let err = SegmentTable::new(vec![bad]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidParameter {
                field: "elastic_modulus_pa",
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_anchor() {
        let err = SegmentTable::new(vec![seg(BoundaryCondition::None)]).unwrap_err();
        assert!(matches!(err, ModelError::BoundaryLayout { .. }));
    }

    #[test]
    fn rejects_second_anchor() {
        let err = SegmentTable::new(vec![
            seg(BoundaryCondition::Fixed),
            seg(BoundaryCondition::Fixed),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::BoundaryLayout { .. }));
    }

    #[test]
    fn parses_csv_table() {
        let csv = "\
length,elastic_modulus,moment_inertia,density,cross_area,type,boundary_condition
0.25,75e9,4.9e-10,6450,7.85e-5,linear,FIXED
0.25,75e9,4.9e-10,6450,7.85e-5,linear,NONE
";
        let table = SegmentTable::from_csv_str(csv).unwrap();
        assert_eq!(table.n_segments(), 2);
        assert_eq!(table.segments()[0].boundary, BoundaryCondition::Fixed);
        assert_eq!(table.segments()[1].element, ElementKind::Linear);
    }

    #[test]
    fn csv_rejects_unknown_element_kind() {
        let csv = "\
length,elastic_modulus,moment_inertia,density,cross_area,type,boundary_condition
0.25,75e9,4.9e-10,6450,7.85e-5,cubic,FIXED
";
        let err = SegmentTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedElement { kind } if kind == "cubic"));
    }

    #[test]
    fn csv_rejects_wrong_header() {
        let err = SegmentTable::from_csv_str("a,b,c\n").unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 1, .. }));
    }

    #[test]
    fn csv_reports_line_of_bad_number() {
        let csv = "\
length,elastic_modulus,moment_inertia,density,cross_area,type,boundary_condition
0.25,75e9,4.9e-10,6450,7.85e-5,linear,FIXED
0.25,stiff,4.9e-10,6450,7.85e-5,linear,NONE
";
        let err = SegmentTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 3, .. }));
    }
}
