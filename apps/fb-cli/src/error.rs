//! CLI error hub: every layer's error converges here so command handlers
//! can use `?` throughout.

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Scenario error: {what}")]
    Scenario { what: String },

    #[error("Model error: {0}")]
    Model(#[from] fb_model::ModelError),

    #[error("Simulation error: {0}")]
    Sim(#[from] fb_sim::SimError),

    #[error("Results error: {0}")]
    Results(#[from] fb_results::ResultsError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
