//! Error types for the HwN request layer.

use aw8624_protocol::{BusError, ProtocolError};
use thiserror::Error;

/// Failures of the in-memory state registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No state recorded for device {0}")]
    NotFound(u32),

    #[error("Could not grow the state registry")]
    AllocationFailure,

    #[error("Record copy failed: {actual} bytes into a {expected} byte record")]
    CopyFailure { expected: usize, actual: usize },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error returned to the HwN host for a get/set request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HwnError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid buffer size {length}: {reason}")]
    InvalidBufferSize { length: usize, reason: &'static str },

    #[error("Bus transaction failed: {0}")]
    Io(#[from] BusError),

    #[error("Chip still busy after {iterations} status polls (last GLB_STATE {last_state:#06x})")]
    PollTimeout { iterations: u32, last_state: u16 },

    #[error("Out of memory while recording device state")]
    AllocationFailure,

    #[error("Record copy failed: {actual} bytes into a {expected} byte record")]
    CopyFailure { expected: usize, actual: usize },

    #[error("No state recorded for device {0}")]
    NotFound(u32),

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HwnError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        HwnError::InvalidParameter(msg.into())
    }

    pub fn invalid_buffer_size(length: usize, reason: &'static str) -> Self {
        HwnError::InvalidBufferSize { length, reason }
    }

    pub fn unimplemented(msg: impl Into<String>) -> Self {
        HwnError::Unimplemented(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        HwnError::Configuration(msg.into())
    }

    /// Whether the same request might succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HwnError::Io(_) | HwnError::PollTimeout { .. })
    }

    /// Whether the request was rejected before touching hardware or state.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            HwnError::InvalidParameter(_)
                | HwnError::InvalidBufferSize { .. }
                | HwnError::Unimplemented(_)
        )
    }
}

impl From<ProtocolError> for HwnError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Bus(bus) => HwnError::Io(bus),
            ProtocolError::PollTimeout {
                iterations,
                last_state,
            } => HwnError::PollTimeout {
                iterations,
                last_state,
            },
            ProtocolError::InvalidCalibration(msg) | ProtocolError::InvalidConfiguration(msg) => {
                HwnError::Configuration(msg)
            }
        }
    }
}

impl From<RegistryError> for HwnError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => HwnError::NotFound(id),
            RegistryError::AllocationFailure => HwnError::AllocationFailure,
            RegistryError::CopyFailure { expected, actual } => {
                HwnError::CopyFailure { expected, actual }
            }
        }
    }
}

pub type HwnResult<T> = Result<T, HwnError>;
