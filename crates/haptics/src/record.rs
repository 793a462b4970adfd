//! Logical per-device settings record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of `u32` setting slots in every record.
pub const SETTINGS_COUNT: usize = 32;

/// Sentinel stored in [`slot::FEATURE_SUPPORT_RESERVED`].
pub const FEATURE_NOT_SUPPORTED: u32 = 0xFFFF_FFFF;

/// Named setting slots.
pub mod slot {
    pub const CYCLE_GRANULARITY: usize = 0;
    pub const CYCLE_TOTAL: usize = 1;
    pub const CYCLE_ON: usize = 2;
    pub const CYCLE_OFF: usize = 3;
    pub const INTENSITY: usize = 4;
    pub const COLOR: usize = 5;
    pub const FEATURE_SUPPORT_RESERVED: usize = 31;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Led,
    #[default]
    Vibrator,
    /// Any other raw tag, carried through unchanged.
    Other(u32),
}

impl DeviceType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => DeviceType::Led,
            1 => DeviceType::Vibrator,
            other => DeviceType::Other(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            DeviceType::Led => 0,
            DeviceType::Vibrator => 1,
            DeviceType::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    #[default]
    Off,
    On,
    Blink,
    Other(u32),
}

impl DeviceMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => DeviceMode::Off,
            1 => DeviceMode::On,
            2 => DeviceMode::Blink,
            other => DeviceMode::Other(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            DeviceMode::Off => 0,
            DeviceMode::On => 1,
            DeviceMode::Blink => 2,
            DeviceMode::Other(raw) => raw,
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceMode::Off => f.write_str("off"),
            DeviceMode::On => f.write_str("on"),
            DeviceMode::Blink => f.write_str("blink"),
            DeviceMode::Other(raw) => write!(f, "mode({raw})"),
        }
    }
}

/// Last requested state of one haptic device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettingRecord {
    pub id: u32,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub mode: DeviceMode,
    #[serde(default)]
    pub settings: [u32; SETTINGS_COUNT],
}

impl Default for DeviceSettingRecord {
    fn default() -> Self {
        Self::vibrator(0)
    }
}

impl DeviceSettingRecord {
    /// Record with all zero settings and normalized reserved slots.
    pub fn new(id: u32, device_type: DeviceType, mode: DeviceMode) -> Self {
        let mut record = Self {
            id,
            device_type,
            mode,
            settings: [0; SETTINGS_COUNT],
        };
        record.normalize();
        record
    }

    /// Vibrator that is off.
    pub fn vibrator(id: u32) -> Self {
        Self::new(id, DeviceType::Vibrator, DeviceMode::Off)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DeviceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force the granularity slot to 0 and the feature-support slot to
    /// [`FEATURE_NOT_SUPPORTED`].
    pub fn normalize(&mut self) {
        if let Some(granularity) = self.settings.get_mut(slot::CYCLE_GRANULARITY) {
            *granularity = 0;
        }
        if let Some(reserved) = self.settings.get_mut(slot::FEATURE_SUPPORT_RESERVED) {
            *reserved = FEATURE_NOT_SUPPORTED;
        }
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.setting(slot::CYCLE_GRANULARITY) == Some(0)
            && self.setting(slot::FEATURE_SUPPORT_RESERVED) == Some(FEATURE_NOT_SUPPORTED)
    }

    pub fn setting(&self, index: usize) -> Option<u32> {
        self.settings.get(index).copied()
    }

    /// Set a slot. Returns `false` if `index` is out of range.
    pub fn set_setting(&mut self, index: usize, value: u32) -> bool {
        match self.settings.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
