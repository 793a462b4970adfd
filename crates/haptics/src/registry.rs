//! Last-applied state per device id.
//!
//! The registry is a shadow of what the host asked for, not a read-back of the
//! chip. Records keep first-insertion order and are never removed except by
//! [`StateRegistry::clear`] on device teardown.

use crate::error::{HwnError, RegistryError, RegistryResult};
use crate::record::DeviceSettingRecord;
use crate::wire::{RECORD_SIZE, decode_record, encode_record};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    records: Vec<DeviceSettingRecord>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an empty registry with the default record for id 0.
    fn seed(&mut self) -> RegistryResult<()> {
        if self.records.is_empty() {
            self.records
                .try_reserve(1)
                .map_err(|_| RegistryError::AllocationFailure)?;
            self.records.push(DeviceSettingRecord::default());
            debug!("seeded state registry with default record");
        }
        Ok(())
    }

    /// Current state for `id`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing was ever recorded for `id`, or
    /// [`RegistryError::AllocationFailure`] if the initial seed cannot be stored.
    pub fn get_state(&mut self, id: u32) -> RegistryResult<DeviceSettingRecord> {
        self.seed()?;
        self.records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Record `state`, replacing any previous record with the same id.
    ///
    /// `length` is how many leading bytes of the encoded `state` to copy, at
    /// most [`RECORD_SIZE`]. A shorter copy overwrites only that prefix of the
    /// record already stored for the id (or of an off vibrator for a new id).
    /// The stored copy always has its reserved slots normalized.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CopyFailure`] if `length` exceeds [`RECORD_SIZE`], or
    /// [`RegistryError::AllocationFailure`] if the registry cannot grow. The
    /// registry is unchanged in both cases.
    pub fn set_state(&mut self, state: &DeviceSettingRecord, length: usize) -> RegistryResult<()> {
        if length > RECORD_SIZE {
            return Err(RegistryError::CopyFailure {
                expected: RECORD_SIZE,
                actual: length,
            });
        }
        let record = match length {
            RECORD_SIZE => state.clone(),
            _ => self.overlay(state, length)?,
        };
        let record = record.normalized();
        self.seed()?;

        if let Some(existing) = self.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
            return Ok(());
        }

        self.records
            .try_reserve(1)
            .map_err(|_| RegistryError::AllocationFailure)?;
        debug!(id = record.id, "recording new device");
        self.records.push(record);
        Ok(())
    }

    /// The record for `state.id` with its first `length` wire bytes taken
    /// from `state`.
    fn overlay(&self, state: &DeviceSettingRecord, length: usize) -> RegistryResult<DeviceSettingRecord> {
        let failure = |err: HwnError| {
            debug!(length, "partial record copy failed: {err}");
            RegistryError::CopyFailure {
                expected: RECORD_SIZE,
                actual: length,
            }
        };
        let base = self
            .records
            .iter()
            .find(|r| r.id == state.id)
            .cloned()
            .unwrap_or_else(|| DeviceSettingRecord::vibrator(state.id));

        let mut target = [0u8; RECORD_SIZE];
        let mut source = [0u8; RECORD_SIZE];
        encode_record(&base, &mut target).map_err(&failure)?;
        encode_record(state, &mut source).map_err(&failure)?;
        if let (Some(dest), Some(src)) = (target.get_mut(..length), source.get(..length)) {
            dest.copy_from_slice(src);
        }

        let mut record = decode_record(&target).map_err(&failure)?;
        record.id = state.id;
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Known ids in first-insertion order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|record| record.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceSettingRecord> {
        self.records.iter()
    }

    /// Drop every record. The next get or set seeds again.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a> IntoIterator for &'a StateRegistry {
    type Item = &'a DeviceSettingRecord;
    type IntoIter = std::slice::Iter<'a, DeviceSettingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DeviceMode, FEATURE_NOT_SUPPORTED, slot};

    #[test]
    fn test_first_get_seeds_default_record() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        assert!(registry.is_empty());

        let record = registry.get_state(0)?;
        assert_eq!(record, DeviceSettingRecord::default());
        assert_eq!(registry.len(), 1);
        Ok(())
    }

    #[test]
    fn test_get_unknown_id_seeds_then_fails() {
        let mut registry = StateRegistry::new();
        assert_eq!(registry.get_state(3), Err(RegistryError::NotFound(3)));
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_set_unseen_id_appends_after_seed() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        let record = DeviceSettingRecord::vibrator(2).with_mode(DeviceMode::On);
        registry.set_state(&record, RECORD_SIZE)?;

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(registry.get_state(2)?.mode, DeviceMode::On);
        Ok(())
    }

    #[test]
    fn test_set_known_id_replaces_in_place() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        registry.set_state(&DeviceSettingRecord::vibrator(1), RECORD_SIZE)?;
        registry.set_state(&DeviceSettingRecord::vibrator(2), RECORD_SIZE)?;
        registry.set_state(
            &DeviceSettingRecord::vibrator(1).with_mode(DeviceMode::On),
            RECORD_SIZE,
        )?;

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(registry.get_state(1)?.mode, DeviceMode::On);
        Ok(())
    }

    #[test]
    fn test_set_normalizes_reserved_slots() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        let mut record = DeviceSettingRecord::vibrator(0);
        record.settings = [0xAB; crate::record::SETTINGS_COUNT];
        registry.set_state(&record, RECORD_SIZE)?;

        let stored = registry.get_state(0)?;
        assert_eq!(stored.setting(slot::CYCLE_GRANULARITY), Some(0));
        assert_eq!(
            stored.setting(slot::FEATURE_SUPPORT_RESERVED),
            Some(FEATURE_NOT_SUPPORTED)
        );
        assert_eq!(stored.setting(slot::INTENSITY), Some(0xAB));
        Ok(())
    }

    #[test]
    fn test_oversized_copy_leaves_registry_untouched() {
        let mut registry = StateRegistry::new();
        let result = registry.set_state(&DeviceSettingRecord::vibrator(5), RECORD_SIZE + 1);
        assert_eq!(
            result,
            Err(RegistryError::CopyFailure {
                expected: 140,
                actual: 141
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_short_copy_overwrites_only_the_prefix() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        let mut stored = DeviceSettingRecord::vibrator(1);
        stored.set_setting(slot::INTENSITY, 80);
        registry.set_state(&stored, RECORD_SIZE)?;

        // id, device_type and mode are the first 12 bytes.
        let mut update = DeviceSettingRecord::vibrator(1).with_mode(DeviceMode::On);
        update.set_setting(slot::INTENSITY, 10);
        registry.set_state(&update, 12)?;

        let merged = registry.get_state(1)?;
        assert_eq!(merged.mode, DeviceMode::On);
        assert_eq!(merged.setting(slot::INTENSITY), Some(80));
        assert_eq!(registry.len(), 2);
        Ok(())
    }

    #[test]
    fn test_short_copy_for_new_id_starts_from_off_vibrator() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        let mut update = DeviceSettingRecord::vibrator(3).with_mode(DeviceMode::On);
        update.set_setting(slot::INTENSITY, 10);
        registry.set_state(&update, RECORD_SIZE - 1)?;

        let stored = registry.get_state(3)?;
        assert_eq!(stored.mode, DeviceMode::On);
        assert_eq!(stored.setting(slot::INTENSITY), Some(10));
        assert!(stored.is_normalized());

        registry.set_state(&DeviceSettingRecord::vibrator(4).with_mode(DeviceMode::On), 0)?;
        assert_eq!(registry.get_state(4)?, DeviceSettingRecord::vibrator(4));
        Ok(())
    }

    #[test]
    fn test_clear_allows_reseed() -> RegistryResult<()> {
        let mut registry = StateRegistry::new();
        registry.set_state(&DeviceSettingRecord::vibrator(4), RECORD_SIZE)?;
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.iter().next().is_none());

        registry.get_state(0)?;
        assert_eq!(registry.len(), 1);
        Ok(())
    }
}
