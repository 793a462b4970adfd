//! Effective calibration profile and the register values derived from it.

use anyhow::Result;
use aw8624_haptics::HapticsConfig;
use aw8624_protocol::{CalibrationProfile, PollExhaustion};
use serde::Serialize;

use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ProfileReport<'a> {
    pub device_count: u32,
    pub poll_limit: u32,
    pub poll_exhaustion: PollExhaustion,
    pub calibration: &'a CalibrationProfile,
    pub derived: DerivedRegisters,
}

/// Values the driver computes from the profile rather than copying verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedRegisters {
    pub f0_pre_divider: u16,
    pub f_pre_h: u16,
    pub f_pre_l: u16,
    pub td_h: u16,
    pub td_l: u16,
    pub zc_thrsh_h: u16,
    pub zc_thrsh_l: u16,
}

impl DerivedRegisters {
    pub fn from_profile(calibration: &CalibrationProfile) -> Result<Self, CliError> {
        let f0_pre_divider = calibration.pre_divider()?;
        let (f_pre_h, f_pre_l) = CalibrationProfile::split(f0_pre_divider);
        let (td_h, td_l) = CalibrationProfile::split(calibration.cont_td);
        let (zc_thrsh_h, zc_thrsh_l) = CalibrationProfile::split(calibration.cont_zc_threshold);
        Ok(Self {
            f0_pre_divider,
            f_pre_h,
            f_pre_l,
            td_h,
            td_l,
            zc_thrsh_h,
            zc_thrsh_l,
        })
    }
}

pub fn execute(config: &HapticsConfig, json: bool) -> Result<()> {
    let calibration = &config.driver.calibration;
    let report = ProfileReport {
        device_count: config.device_count,
        poll_limit: config.driver.poll_limit,
        poll_exhaustion: config.driver.poll_exhaustion,
        calibration,
        derived: DerivedRegisters::from_profile(calibration)?,
    };
    output::print_profile(&report, json)
}
