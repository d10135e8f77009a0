use thiserror::Error;

pub type FbResult<T> = Result<T, FbError>;

#[derive(Error, Debug)]
pub enum FbError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
