//! AW8624 bus and protocol error types.

use thiserror::Error;

/// A failed register transaction on the hardware channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Read of register {register:#04x} failed: {reason}")]
    Read { register: u8, reason: String },

    #[error("Write of {value:#06x} to register {register:#04x} failed: {reason}")]
    Write {
        register: u8,
        value: u16,
        reason: String,
    },
}

impl BusError {
    pub fn read(register: u8, reason: impl Into<String>) -> Self {
        BusError::Read {
            register,
            reason: reason.into(),
        }
    }

    pub fn write(register: u8, value: u16, reason: impl Into<String>) -> Self {
        BusError::Write {
            register,
            value,
            reason: reason.into(),
        }
    }

    /// Register address of the transaction that failed.
    pub fn register(&self) -> u8 {
        match self {
            BusError::Read { register, .. } | BusError::Write { register, .. } => *register,
        }
    }
}

pub type BusResult<T> = Result<T, BusError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Chip still busy after {iterations} status polls (last GLB_STATE {last_state:#06x})")]
    PollTimeout { iterations: u32, last_state: u16 },

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid driver configuration: {0}")]
    InvalidConfiguration(String),
}

impl ProtocolError {
    pub fn invalid_calibration(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidCalibration(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidConfiguration(msg.into())
    }

    /// Whether repeating the same transition might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProtocolError::Bus(_) | ProtocolError::PollTimeout { .. }
        )
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
