//! Per-part calibration constants.
//!
//! Defaults match the reference LRA the driver ships with. A board with a
//! different actuator supplies its own profile, typically deserialized from a
//! JSON or YAML file.

use crate::error::{ProtocolError, ProtocolResult};
use crate::registers::bemf_num;
use serde::{Deserialize, Serialize};

/// Chip constants programmed at initialization and before continuous drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationProfile {
    /// Base clock used to derive the F0 pre-divider (Hz * 1000).
    pub clock_base: u64,
    /// Expected resonant frequency, in 0.1 Hz.
    pub f0_pre: u32,
    pub f0_coeff: u32,
    /// Continuous-drive trigger delay, split across `TD_H`/`TD_L`.
    pub cont_td: u16,
    pub tset: u8,
    /// Zero-cross threshold, split across `ZC_THRSH_H`/`ZC_THRSH_L`.
    pub cont_zc_threshold: u16,
    /// Number of braking half-cycles after continuous drive stops (0..=15).
    pub cont_brake_count: u8,
    pub time_nzc: u8,
    pub drive_level: u8,
    pub overdrive_level: u8,
    pub sw_brake: u8,
    pub brake_end_threshold: u8,
    /// Back-EMF thresholds in register order: VTHH_H, VTHH_L, VTHL_H, VTHL_L.
    pub bemf_thresholds: [u8; 4],
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            clock_base: 1_000_000_000,
            f0_pre: 2050,
            f0_coeff: 260,
            cont_td: 0xF06C,
            tset: 0x11,
            cont_zc_threshold: 0x08F8,
            cont_brake_count: 3,
            time_nzc: 0x23,
            drive_level: 0x6B,
            overdrive_level: 0x9B,
            sw_brake: 0x2C,
            brake_end_threshold: 0x00,
            bemf_thresholds: [0x00, 0x08, 0x03, 0xF8],
        }
    }
}

impl CalibrationProfile {
    /// F0 pre-divider written to `F_PRE_H`/`F_PRE_L`:
    /// `clock_base / f0_pre / f0_coeff`, each division truncating.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidCalibration`] if a divisor is zero or the
    /// result does not fit in 16 bits.
    pub fn pre_divider(&self) -> ProtocolResult<u16> {
        let value = self
            .clock_base
            .checked_div(u64::from(self.f0_pre))
            .and_then(|v| v.checked_div(u64::from(self.f0_coeff)))
            .ok_or_else(|| {
                ProtocolError::invalid_calibration("f0_pre and f0_coeff must be non-zero")
            })?;
        u16::try_from(value).map_err(|_| {
            ProtocolError::invalid_calibration(format!(
                "pre-divider {value} does not fit in 16 bits"
            ))
        })
    }

    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the pre-divider cannot be derived or the brake count
    /// does not fit `BEMF_NUM.BRK_NUM`.
    pub fn validate(&self) -> ProtocolResult<()> {
        self.pre_divider()?;
        if u16::from(self.cont_brake_count) > bemf_num::BRK_NUM.max_value() {
            return Err(ProtocolError::invalid_calibration(format!(
                "cont_brake_count must be at most {}",
                bemf_num::BRK_NUM.max_value()
            )));
        }
        Ok(())
    }

    /// Split a 16-bit constant into its `(high, low)` register bytes.
    pub fn split(value: u16) -> (u16, u16) {
        (value >> 8, value & 0x00FF)
    }
}
