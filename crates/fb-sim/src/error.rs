//! Error types for simulation operations.

use fb_core::FbError;
use fb_model::ModelError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Configuration mismatch for {what}: expected {expected}, got {actual}")]
    ConfigMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Integration failed at t = {t_reached} s: {what}")]
    IntegrationFailed { t_reached: f64, what: &'static str },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<FbError> for SimError {
    fn from(e: FbError) -> Self {
        match e {
            FbError::InvalidArg { what } => SimError::InvalidArg { what },
            FbError::NonFinite { what, .. } => SimError::InvalidArg { what },
        }
    }
}
