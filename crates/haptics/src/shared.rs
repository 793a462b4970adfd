use crate::device::HapticsDevice;
use crate::error::HwnResult;
use crate::record::{DeviceMode, DeviceSettingRecord};
use crate::wire::DeviceInformation;
use aw8624_protocol::RegisterBus;
use parking_lot::Mutex;
use std::sync::Arc;

/// Thread-safe wrapper for a haptics device.
///
/// One lock covers the registry and the bus, so a set request and its
/// registry update are never interleaved with another request.
pub struct SharedHapticsDevice<B: RegisterBus> {
    inner: Arc<Mutex<HapticsDevice<B>>>,
}

impl<B: RegisterBus> SharedHapticsDevice<B> {
    pub fn new(device: HapticsDevice<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Run `f` with exclusive access to the device.
    pub fn with<R>(&self, f: impl FnOnce(&mut HapticsDevice<B>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn set_device_mode(&self, id: u32, mode: DeviceMode) -> HwnResult<()> {
        self.inner.lock().set_device_mode(id, mode)
    }

    pub fn get_device_mode(&self, id: u32) -> HwnResult<DeviceSettingRecord> {
        self.inner.lock().get_device_mode(id)
    }

    pub fn set_state(&self, buffer: &[u8]) -> HwnResult<usize> {
        self.inner.lock().set_state(buffer)
    }

    pub fn get_state(&self, output: &mut [u8], selector: Option<&mut [u8]>) -> HwnResult<usize> {
        self.inner.lock().get_state(output, selector)
    }

    pub fn query_device_information(&self) -> DeviceInformation {
        self.inner.lock().query_device_information()
    }

    /// Recover the device once every other handle is gone.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other clones are alive.
    pub fn try_into_inner(self) -> Result<HapticsDevice<B>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<B: RegisterBus> Clone for SharedHapticsDevice<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
