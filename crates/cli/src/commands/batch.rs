//! Round trip a file of device records through the set and get handlers.

use anyhow::Result;
use aw8624_haptics::{DeviceSettingRecord, HapticsConfig, HapticsDevice, wire};
use aw8624_protocol::SimulatedChip;
use std::path::Path;
use tracing::info;

use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug)]
pub struct BatchReport {
    /// Bytes the set handler reported as consumed.
    pub consumed: usize,
    /// Bytes the get handler reported as written.
    pub produced: usize,
    /// Registry state for each requested id, as returned by get.
    pub records: Vec<DeviceSettingRecord>,
    /// The selector frame after get overwrote it.
    pub frame: Vec<u8>,
}

/// Encode `records` into a set frame, dispatch it on a simulated device and
/// read the same ids back through a selector get.
pub fn run(config: &HapticsConfig, records: &[DeviceSettingRecord]) -> Result<BatchReport, CliError> {
    if records.is_empty() {
        return Err(CliError::InvalidConfiguration(
            "request file holds no records".to_string(),
        ));
    }

    let set_frame = wire::encode_frame(records)?;
    let mut device = HapticsDevice::initialize(SimulatedChip::new(), config.clone())?;
    let consumed = device.set_state(&set_frame)?;

    let mut selector = set_frame.clone();
    let mut output = vec![0u8; set_frame.len()];
    let produced = device.get_state(&mut output, Some(&mut selector))?;
    let echoed = wire::decode_frame(&selector)?;
    info!(records = echoed.len(), consumed, produced, "batch applied");

    Ok(BatchReport {
        consumed,
        produced,
        records: echoed,
        frame: selector,
    })
}

pub fn execute(config: &HapticsConfig, file: &Path, hex: bool, json: bool) -> Result<()> {
    let records: Vec<DeviceSettingRecord> = config::read_file(file)?;
    let report = run(config, &records)?;
    output::print_batch(&report, hex, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw8624_haptics::{DeviceMode, HwnError, slot};

    #[test]
    fn applied_records_come_back_normalized() -> Result<(), Box<dyn std::error::Error>> {
        let mut on = DeviceSettingRecord::vibrator(0).with_mode(DeviceMode::On);
        assert!(on.set_setting(slot::CYCLE_GRANULARITY, 9));
        assert!(on.set_setting(slot::INTENSITY, 60));

        let report = run(&HapticsConfig::default(), &[on])?;
        assert_eq!(report.consumed, 152);
        assert_eq!(report.produced, 152);
        assert_eq!(report.frame.len(), 152);
        assert_eq!(report.records.len(), 1);
        let echoed = report.records.first().ok_or("no record echoed")?;
        assert_eq!(echoed.mode, DeviceMode::On);
        assert_eq!(echoed.setting(slot::CYCLE_GRANULARITY), Some(0));
        assert_eq!(echoed.setting(slot::INTENSITY), Some(60));
        Ok(())
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let result = run(
            &HapticsConfig::default(),
            &[DeviceSettingRecord::vibrator(3)],
        );
        assert!(matches!(
            result,
            Err(CliError::Request(HwnError::InvalidParameter(_)))
        ));
    }

    #[test]
    fn empty_request_is_a_configuration_error() {
        assert!(matches!(
            run(&HapticsConfig::default(), &[]),
            Err(CliError::InvalidConfiguration(_))
        ));
    }
}
