//! Hardware-notification (HwN) request layer for AW8624 haptic devices.
//!
//! A [`HapticsDevice`] owns one initialized [`Aw8624`](aw8624_protocol::Aw8624)
//! and a [`StateRegistry`] of the last settings applied to each device id. Host
//! get/set requests arrive as little-endian frames (see [`wire`]) and are
//! handled by a [`RequestDispatcher`] borrowed from the device.

#![deny(static_mut_refs)]

pub mod device;
pub mod dispatcher;
pub mod error;
pub mod record;
pub mod registry;
pub mod shared;
pub mod wire;

pub use device::{DEFAULT_DEVICE_COUNT, HapticsConfig, HapticsConfigBuilder, HapticsDevice};
pub use dispatcher::RequestDispatcher;
pub use error::{HwnError, HwnResult, RegistryError, RegistryResult};
pub use record::{
    DeviceMode, DeviceSettingRecord, DeviceType, FEATURE_NOT_SUPPORTED, SETTINGS_COUNT, slot,
};
pub use registry::StateRegistry;
pub use shared::SharedHapticsDevice;
pub use wire::{
    DeviceInformation, HEADER_SIZE, PAYLOAD_VERSION, PayloadHeader, RECORD_SIZE, validate_frame,
};
