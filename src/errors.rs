//! Error types for apigee-variabilizer
//!
//! Variabilization itself never fails; these cover reading inputs and
//! configuration, and writing reports.

use thiserror::Error;

/// Main error type for apigee-variabilizer
#[derive(Error, Debug)]
pub enum VariabilizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, VariabilizerError>;
