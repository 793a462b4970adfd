//! [`RegisterBus`] over an embedded-hal 1.0 I2C controller.
//!
//! Register values travel as two bytes, low byte first. A read is a combined
//! write-read of the register address; a write sends `[register, low, high]`.

use crate::bus::RegisterBus;
use crate::error::{BusError, BusResult};
use embedded_hal::i2c::{Error as _, I2c, SevenBitAddress};

/// Factory 7-bit address of the AW8624.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x5A;

#[derive(Debug)]
pub struct I2cBus<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C: I2c> I2cBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Give back the underlying controller.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c + Send> RegisterBus for I2cBus<I2C> {
    fn read_register(&mut self, register: u8) -> BusResult<u16> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| BusError::read(register, format!("{:?}", e.kind())))?;
        Ok(u16::from_le_bytes(buf))
    }

    fn write_register(&mut self, register: u8, value: u16) -> BusResult<()> {
        let [low, high] = value.to_le_bytes();
        self.i2c
            .write(self.address, &[register, low, high])
            .map_err(|e| BusError::write(register, value, format!("{:?}", e.kind())))
    }
}
