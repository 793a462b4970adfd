//! Hardware channel abstraction.
//!
//! The protocol only ever needs two synchronous primitives: read a 16-bit
//! register and write a 16-bit register. Transport details (I2C address, byte
//! order, retries in the controller) belong to the implementor.

use crate::error::BusResult;

/// Synchronous register-addressed bus to one AW8624.
#[cfg_attr(test, mockall::automock)]
pub trait RegisterBus: Send {
    fn read_register(&mut self, register: u8) -> BusResult<u16>;

    fn write_register(&mut self, register: u8, value: u16) -> BusResult<()>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_register(&mut self, register: u8) -> BusResult<u16> {
        (**self).read_register(register)
    }

    fn write_register(&mut self, register: u8, value: u16) -> BusResult<()> {
        (**self).write_register(register, value)
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn read_register(&mut self, register: u8) -> BusResult<u16> {
        (**self).read_register(register)
    }

    fn write_register(&mut self, register: u8, value: u16) -> BusResult<()> {
        (**self).write_register(register, value)
    }
}
