//! Translates HwN requests into chip transitions and registry updates.

use crate::error::{HwnError, HwnResult};
use crate::record::{DeviceMode, DeviceSettingRecord};
use crate::registry::StateRegistry;
use crate::wire::{
    self, DeviceInformation, HEADER_SIZE, PayloadHeader, RECORD_SIZE, decode_record,
    encode_record, validate_frame,
};
use aw8624_protocol::{Aw8624, ProtocolError, RegisterBus};
use tracing::{debug, warn};

/// Borrowed view over one device's chip driver and registry.
///
/// Reads are answered from the registry only; writes reach the registry only
/// after the chip transition succeeded.
#[derive(Debug)]
pub struct RequestDispatcher<'a, B: RegisterBus> {
    chip: &'a mut Aw8624<B>,
    registry: &'a mut StateRegistry,
    device_count: u32,
}

impl<'a, B: RegisterBus> RequestDispatcher<'a, B> {
    pub fn new(
        chip: &'a mut Aw8624<B>,
        registry: &'a mut StateRegistry,
        device_count: u32,
    ) -> Self {
        Self {
            chip,
            registry,
            device_count,
        }
    }

    pub fn device_count(&self) -> u32 {
        self.device_count
    }

    fn check_id(&self, id: u32) -> HwnResult<()> {
        if id >= self.device_count {
            warn!(id, device_count = self.device_count, "rejecting request for unknown device");
            return Err(HwnError::invalid_parameter(format!(
                "device id {id} out of range (device count {})",
                self.device_count
            )));
        }
        Ok(())
    }

    /// Switch device `id` to `mode`, keeping its other settings.
    pub fn set_device_mode(&mut self, id: u32, mode: DeviceMode) -> HwnResult<()> {
        self.check_id(id)?;
        let record = self
            .registry
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .unwrap_or_else(|| DeviceSettingRecord::vibrator(id));
        self.apply_record(&record.with_mode(mode))
    }

    /// Drive the chip for `record` and, on success, remember it.
    ///
    /// A Stop that times out has still left the chip in standby, so an Off
    /// record is remembered before the timeout is returned.
    pub fn apply_record(&mut self, record: &DeviceSettingRecord) -> HwnResult<()> {
        self.check_id(record.id)?;
        debug!(id = record.id, mode = %record.mode, "applying record");
        match record.mode {
            DeviceMode::Off => match self.chip.stop() {
                Ok(()) => {}
                Err(err @ ProtocolError::PollTimeout { .. }) => {
                    warn!(id = record.id, "recording off after stop timeout");
                    self.registry.set_state(record, RECORD_SIZE)?;
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            },
            DeviceMode::On => self.chip.vibrate_continuous()?,
            other => {
                warn!(id = record.id, mode = %other, "unsupported mode");
                return Err(HwnError::unimplemented(format!("device mode {other}")));
            }
        }
        self.registry.set_state(record, RECORD_SIZE)?;
        Ok(())
    }

    /// Last applied state of device `id`. Never touches the chip.
    pub fn get_device_mode(&mut self, id: u32) -> HwnResult<DeviceSettingRecord> {
        Ok(self.registry.get_state(id)?)
    }

    /// Apply every record of a set frame in order.
    ///
    /// Returns the number of bytes consumed, which is the whole buffer. The
    /// first failing record aborts the batch; records before it stay applied.
    pub fn set_state(&mut self, buffer: &[u8]) -> HwnResult<usize> {
        let count = validate_frame(buffer.len())?;
        debug!(count, "set state");
        let body = buffer.get(HEADER_SIZE..).unwrap_or_default();
        for (index, chunk) in body.chunks_exact(RECORD_SIZE).enumerate() {
            let record = decode_record(chunk)?;
            if let Err(err) = self.apply_record(&record) {
                warn!(index, id = record.id, "batch aborted: {err}");
                return Err(err);
            }
        }
        Ok(buffer.len())
    }

    /// Fill a get frame.
    ///
    /// Without a selector, `output` receives a header and the state of ids
    /// `0..device_count`; the payload size is returned. With a selector, each
    /// selector record is overwritten in place with the state of its id and the
    /// selector length is returned. `output` must be a valid frame either way.
    pub fn get_state(&mut self, output: &mut [u8], selector: Option<&mut [u8]>) -> HwnResult<usize> {
        let capacity = validate_frame(output.len())?;

        if let Some(selector) = selector {
            let count = validate_frame(selector.len())?;
            debug!(count, "get state with selector");
            let body = selector.get_mut(HEADER_SIZE..).unwrap_or_default();
            for chunk in body.chunks_exact_mut(RECORD_SIZE) {
                let id = decode_record(chunk)?.id;
                let state = self.registry.get_state(id)?;
                encode_record(&state, chunk)?;
            }
            return Ok(selector.len());
        }

        let device_count = usize::try_from(self.device_count)
            .map_err(|_| HwnError::invalid_parameter("device count exceeds usize"))?;
        if capacity < device_count {
            return Err(HwnError::invalid_buffer_size(
                output.len(),
                "output cannot hold every device",
            ));
        }
        debug!(device_count, "get state");

        let header = PayloadHeader::for_records(device_count)?;
        header.encode_into(output)?;
        for id in 0..self.device_count {
            let state = self.registry.get_state(id)?;
            let range = usize::try_from(id)
                .ok()
                .and_then(wire::record_range)
                .ok_or_else(|| HwnError::invalid_parameter("record offset overflows"))?;
            let len = output.len();
            let slot = output
                .get_mut(range)
                .ok_or_else(|| HwnError::invalid_buffer_size(len, "output too small"))?;
            encode_record(&state, slot)?;
        }
        usize::try_from(header.payload_size)
            .map_err(|_| HwnError::invalid_parameter("payload size exceeds usize"))
    }

    pub fn query_device_information(&self) -> DeviceInformation {
        DeviceInformation::new(self.device_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw8624_protocol::{ChipState, DriverConfig, SimulatedChip};

    fn fixture() -> HwnResult<(SimulatedChip, Aw8624<SimulatedChip>, StateRegistry)> {
        let sim = SimulatedChip::new();
        let mut chip = Aw8624::new(sim.clone(), DriverConfig::default())?;
        chip.initialize()?;
        Ok((sim, chip, StateRegistry::new()))
    }

    #[test]
    fn test_set_device_mode_on_drives_chip() -> HwnResult<()> {
        let (sim, mut chip, mut registry) = fixture()?;
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        dispatcher.set_device_mode(0, DeviceMode::On)?;
        assert_eq!(dispatcher.get_device_mode(0)?.mode, DeviceMode::On);
        assert!(sim.is_playing());
        assert_eq!(chip.state(), ChipState::ActiveContinuous);
        Ok(())
    }

    #[test]
    fn test_out_of_range_id_has_no_effect() -> HwnResult<()> {
        let (sim, mut chip, mut registry) = fixture()?;
        sim.take_log();
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        let err = dispatcher.set_device_mode(1, DeviceMode::On);
        assert!(matches!(err, Err(HwnError::InvalidParameter(_))));
        assert!(registry.is_empty());
        assert!(sim.log().is_empty());
        Ok(())
    }

    #[test]
    fn test_blink_is_unimplemented() -> HwnResult<()> {
        let (sim, mut chip, mut registry) = fixture()?;
        sim.take_log();
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        let record = DeviceSettingRecord::vibrator(0).with_mode(DeviceMode::Blink);
        assert!(matches!(
            dispatcher.apply_record(&record),
            Err(HwnError::Unimplemented(_))
        ));
        assert!(sim.log().is_empty());
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_set_device_mode_failure_leaves_registry_empty() -> HwnResult<()> {
        let (_sim, mut chip, mut registry) = fixture()?;
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        assert!(matches!(
            dispatcher.set_device_mode(0, DeviceMode::Blink),
            Err(HwnError::Unimplemented(_))
        ));
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_set_device_mode_keeps_stored_settings() -> HwnResult<()> {
        let (_sim, mut chip, mut registry) = fixture()?;
        let mut stored = DeviceSettingRecord::vibrator(1);
        stored.set_setting(crate::record::slot::INTENSITY, 55);
        registry.set_state(&stored, RECORD_SIZE)?;
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 2);

        dispatcher.set_device_mode(1, DeviceMode::On)?;
        let record = dispatcher.get_device_mode(1)?;
        assert_eq!(record.mode, DeviceMode::On);
        assert_eq!(record.setting(crate::record::slot::INTENSITY), Some(55));
        Ok(())
    }

    #[test]
    fn test_off_is_recorded_when_stop_times_out() -> HwnResult<()> {
        let sim = SimulatedChip::new();
        let config = DriverConfig::builder().poll_limit(3).build()?;
        let mut chip = Aw8624::new(sim.clone(), config)?;
        chip.initialize()?;
        let mut registry = StateRegistry::new();
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        dispatcher.set_device_mode(0, DeviceMode::On)?;
        sim.set_stuck_busy(true);

        assert_eq!(
            dispatcher.set_device_mode(0, DeviceMode::Off),
            Err(HwnError::PollTimeout {
                iterations: 3,
                last_state: 0x0008
            })
        );
        assert_eq!(dispatcher.get_device_mode(0)?.mode, DeviceMode::Off);
        assert_eq!(chip.state(), ChipState::Standby);
        Ok(())
    }

    #[test]
    fn test_failed_transition_is_not_persisted() -> HwnResult<()> {
        let (sim, mut chip, mut registry) = fixture()?;
        sim.inject(aw8624_protocol::Fault::WriteTo(aw8624_protocol::registers::reg::DRV_LVL));
        let mut dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 1);

        assert!(matches!(
            dispatcher.set_device_mode(0, DeviceMode::On),
            Err(HwnError::Io(_))
        ));
        assert_eq!(dispatcher.get_device_mode(0)?.mode, DeviceMode::Off);
        Ok(())
    }

    #[test]
    fn test_device_information() -> HwnResult<()> {
        let (_sim, mut chip, mut registry) = fixture()?;
        let dispatcher = RequestDispatcher::new(&mut chip, &mut registry, 2);
        let info = dispatcher.query_device_information();
        assert_eq!((info.version, info.size, info.total_devices), (1, 12, 2));
        Ok(())
    }
}
