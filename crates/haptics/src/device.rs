//! Per-device context: chip driver, state registry and configuration.

use crate::dispatcher::RequestDispatcher;
use crate::error::{HwnError, HwnResult};
use crate::record::{DeviceMode, DeviceSettingRecord};
use crate::registry::StateRegistry;
use crate::wire::DeviceInformation;
use aw8624_protocol::{Aw8624, DriverConfig, PollDelay, RegisterBus};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Device count reported when the platform does not say otherwise.
pub const DEFAULT_DEVICE_COUNT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HapticsConfig {
    /// Number of haptic devices behind this chip. Ids `0..device_count` are
    /// valid in requests.
    pub device_count: u32,

    pub driver: DriverConfig,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            device_count: DEFAULT_DEVICE_COUNT,
            driver: DriverConfig::default(),
        }
    }
}

impl HapticsConfig {
    #[must_use]
    pub fn builder() -> HapticsConfigBuilder {
        HapticsConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HwnError::Configuration`] if `device_count` is zero or the
    /// driver configuration is invalid.
    pub fn validate(&self) -> HwnResult<()> {
        if self.device_count == 0 {
            return Err(HwnError::configuration("device_count must be at least 1"));
        }
        self.driver.validate()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HapticsConfigBuilder {
    config: HapticsConfig,
}

impl HapticsConfigBuilder {
    #[must_use]
    pub fn device_count(mut self, count: u32) -> Self {
        self.config.device_count = count;
        self
    }

    #[must_use]
    pub fn driver(mut self, driver: DriverConfig) -> Self {
        self.config.driver = driver;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> HwnResult<HapticsConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// One initialized AW8624 and the devices it serves.
///
/// Entry points take `&mut self`; the host delivers one request at a time.
/// Use [`SharedHapticsDevice`](crate::SharedHapticsDevice) when that is not
/// guaranteed.
#[derive(Debug)]
pub struct HapticsDevice<B: RegisterBus> {
    chip: Aw8624<B>,
    registry: StateRegistry,
    device_count: u32,
}

impl<B: RegisterBus> HapticsDevice<B> {
    /// Run chip initialization and return a ready device.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or any initialization transaction
    /// fails.
    pub fn initialize(bus: B, config: HapticsConfig) -> HwnResult<Self> {
        Self::setup(bus, config, None)
    }

    /// As [`initialize`](Self::initialize), pausing with `delay` between Stop
    /// status polls.
    pub fn initialize_with_poll_delay(
        bus: B,
        config: HapticsConfig,
        delay: impl PollDelay + 'static,
    ) -> HwnResult<Self> {
        Self::setup(bus, config, Some(Box::new(delay)))
    }

    fn setup(bus: B, config: HapticsConfig, delay: Option<Box<dyn PollDelay>>) -> HwnResult<Self> {
        config.validate()?;
        let mut chip = Aw8624::new(bus, config.driver)?;
        if let Some(delay) = delay {
            chip = chip.with_boxed_poll_delay(delay);
        }
        chip.initialize()?;
        info!(device_count = config.device_count, "haptics device ready");
        Ok(Self {
            chip,
            registry: StateRegistry::new(),
            device_count: config.device_count,
        })
    }

    /// Tear down the registry and hand back the bus.
    pub fn uninitialize(mut self) -> B {
        info!(records = self.registry.len(), "haptics device uninitialized");
        self.registry.clear();
        self.chip.into_bus()
    }

    pub fn dispatcher(&mut self) -> RequestDispatcher<'_, B> {
        RequestDispatcher::new(&mut self.chip, &mut self.registry, self.device_count)
    }

    pub fn set_device_mode(&mut self, id: u32, mode: DeviceMode) -> HwnResult<()> {
        self.dispatcher().set_device_mode(id, mode)
    }

    pub fn apply_record(&mut self, record: &DeviceSettingRecord) -> HwnResult<()> {
        self.dispatcher().apply_record(record)
    }

    pub fn get_device_mode(&mut self, id: u32) -> HwnResult<DeviceSettingRecord> {
        self.dispatcher().get_device_mode(id)
    }

    pub fn set_state(&mut self, buffer: &[u8]) -> HwnResult<usize> {
        self.dispatcher().set_state(buffer)
    }

    pub fn get_state(&mut self, output: &mut [u8], selector: Option<&mut [u8]>) -> HwnResult<usize> {
        self.dispatcher().get_state(output, selector)
    }

    pub fn query_device_information(&self) -> DeviceInformation {
        DeviceInformation::new(self.device_count)
    }

    pub fn device_count(&self) -> u32 {
        self.device_count
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn chip(&self) -> &Aw8624<B> {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Aw8624<B> {
        &mut self.chip
    }
}
