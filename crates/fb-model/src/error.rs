//! Error types for model construction and evaluation.

use fb_core::FbError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid parameter: {field} = {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Boundary condition layout: {what}")]
    BoundaryLayout { what: &'static str },

    #[error("Unsupported element type: {kind:?}")]
    UnsupportedElement { kind: String },

    #[error("Segment table parse error at line {line}: {what}")]
    Parse { line: usize, what: String },

    #[error("Singular system: {what}")]
    Singular { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Numeric error: {0}")]
    Numeric(#[from] FbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
