//! Error types for hapticsctl

use aw8624_haptics::HwnError;
use aw8624_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Request rejected: {0}")]
    Request(#[from] HwnError),

    #[error("Driver error: {0}")]
    Driver(#[from] ProtocolError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl CliError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::IoError(_) => 2,
            CliError::InvalidConfiguration(_)
            | CliError::UnsupportedFormat(_)
            | CliError::JsonError(_)
            | CliError::YamlError(_) => 3,
            CliError::Request(e) if e.is_request_error() => 4,
            CliError::Request(_) | CliError::Driver(_) => 5,
        }
    }
}
