//! Awinic AW8624 LRA haptic driver: register map, bus abstraction and the
//! state-transition sequences that move the chip between standby, RAM
//! playback and closed-loop continuous drive.
//!
//! The crate performs no I/O of its own. Hardware access goes through the
//! [`RegisterBus`] trait; an embedded-hal adapter ([`I2cBus`]) and a
//! register-file simulator ([`SimulatedChip`]) are provided behind features.

#![deny(static_mut_refs)]

pub mod bus;
pub mod calibration;
pub mod config;
pub mod error;
#[cfg(feature = "embedded-hal")]
pub mod i2c;
pub mod poll;
pub mod protocol;
pub mod registers;
#[cfg(feature = "sim")]
pub mod sim;

pub use bus::RegisterBus;
pub use calibration::CalibrationProfile;
pub use config::{DEFAULT_POLL_LIMIT, DriverConfig, DriverConfigBuilder, PollExhaustion};
pub use error::{BusError, BusResult, ProtocolError, ProtocolResult};
#[cfg(feature = "embedded-hal")]
pub use i2c::{DEFAULT_ADDRESS, I2cBus};
pub use poll::{BusyWait, PollDelay, Sleep, YieldNow};
pub use protocol::{Aw8624, ChipState};
pub use registers::{CHIP_ID, Field, SOFT_RESET_MAGIC};
#[cfg(feature = "sim")]
pub use sim::{BUSY_STATE, BusOp, Fault, SimulatedChip};
