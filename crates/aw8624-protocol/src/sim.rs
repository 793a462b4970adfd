//! Register-file model of an AW8624.
//!
//! [`SimulatedChip`] stores every register write, answers reads from the
//! stored values and mimics the handful of registers with side effects: soft
//! reset through `ID`, clear-on-read `SYSINT` and the `GLB_STATE` playback
//! status driven by `GO`. Every successful transaction is logged, and faults
//! can be injected per register or after a number of transactions.
//!
//! Clones share the same chip, so a test can hand one clone to the driver and
//! inspect the other.

use crate::bus::RegisterBus;
use crate::error::{BusError, BusResult};
use crate::registers::{CHIP_ID, SOFT_RESET_MAGIC, go, reg};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// `GLB_STATE` value reported while the playback engine is running.
pub const BUSY_STATE: u16 = 0x0008;

const REGISTER_COUNT: usize = 256;

/// One logged bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BusOp {
    Read { register: u8, value: u16 },
    Write { register: u8, value: u16 },
}

impl BusOp {
    pub fn register(&self) -> u8 {
        match self {
            BusOp::Read { register, .. } | BusOp::Write { register, .. } => *register,
        }
    }

    pub fn value(&self) -> u16 {
        match self {
            BusOp::Read { value, .. } | BusOp::Write { value, .. } => *value,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, BusOp::Write { .. })
    }
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_write() { "W" } else { "R" };
        let register = self.register();
        match reg::name(register) {
            Some(name) => write!(f, "{kind} {name:<12} {:#06x}", self.value()),
            None => write!(f, "{kind} {register:<#12x} {:#06x}", self.value()),
        }
    }
}

/// Injected failure condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every read of this register fails.
    ReadOf(u8),
    /// Every write to this register fails.
    WriteTo(u8),
    /// Every transaction fails once this many have succeeded.
    AfterTransactions(u64),
}

#[derive(Debug)]
struct ChipModel {
    registers: Vec<u16>,
    log: Vec<BusOp>,
    faults: Vec<Fault>,
    transactions: u64,
    settle_polls: u32,
    countdown: u32,
    playing: bool,
    stuck_busy: bool,
}

impl ChipModel {
    fn new() -> Self {
        let mut model = Self {
            registers: vec![0; REGISTER_COUNT],
            log: Vec::new(),
            faults: Vec::new(),
            transactions: 0,
            settle_polls: 0,
            countdown: 0,
            playing: false,
            stuck_busy: false,
        };
        model.reset();
        model
    }

    fn reset(&mut self) {
        self.registers.fill(0);
        self.store(reg::ID, CHIP_ID);
        self.playing = false;
        self.countdown = 0;
    }

    fn load(&self, register: u8) -> u16 {
        self.registers
            .get(usize::from(register))
            .copied()
            .unwrap_or_default()
    }

    fn store(&mut self, register: u8, value: u16) {
        if let Some(slot) = self.registers.get_mut(usize::from(register)) {
            *slot = value;
        }
    }

    fn check(&self, failing: Fault) -> bool {
        self.faults.iter().any(|fault| match fault {
            Fault::AfterTransactions(limit) => self.transactions >= *limit,
            other => *other == failing,
        })
    }

    fn read(&mut self, register: u8) -> BusResult<u16> {
        if self.check(Fault::ReadOf(register)) {
            return Err(BusError::read(register, "injected fault"));
        }
        let value = match register {
            reg::GLB_STATE => self.playback_state(),
            reg::SYSINT => {
                let latched = self.load(reg::SYSINT);
                self.store(reg::SYSINT, 0);
                latched
            }
            other => self.load(other),
        };
        self.transactions = self.transactions.saturating_add(1);
        self.log.push(BusOp::Read { register, value });
        Ok(value)
    }

    fn write(&mut self, register: u8, value: u16) -> BusResult<()> {
        if self.check(Fault::WriteTo(register)) {
            return Err(BusError::write(register, value, "injected fault"));
        }
        if register == reg::ID && value == SOFT_RESET_MAGIC {
            self.reset();
        } else {
            if register == reg::GO {
                let go_bit = go::GO.decode(value) == 1;
                if self.playing && !go_bit {
                    self.countdown = self.settle_polls;
                }
                self.playing = go_bit;
            }
            self.store(register, value);
        }
        self.transactions = self.transactions.saturating_add(1);
        self.log.push(BusOp::Write { register, value });
        Ok(())
    }

    fn playback_state(&mut self) -> u16 {
        if self.stuck_busy || self.playing {
            return BUSY_STATE;
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return BUSY_STATE;
        }
        0
    }
}

/// Shared handle to a simulated chip.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    inner: Arc<Mutex<ChipModel>>,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChip {
    /// Freshly powered chip: all registers zero except `ID`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChipModel::new())),
        }
    }

    /// Number of busy `GLB_STATE` reads after GO is cleared.
    #[must_use]
    pub fn with_settle_polls(self, polls: u32) -> Self {
        self.inner.lock().settle_polls = polls;
        self
    }

    /// Keep `GLB_STATE` busy regardless of GO.
    pub fn set_stuck_busy(&self, stuck: bool) {
        self.inner.lock().stuck_busy = stuck;
    }

    pub fn inject(&self, fault: Fault) {
        self.inner.lock().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }

    /// Current register value, without logging or side effects.
    pub fn register(&self, register: u8) -> u16 {
        self.inner.lock().load(register)
    }

    /// Overwrite a register, without logging or side effects.
    pub fn set_register(&self, register: u8, value: u16) {
        self.inner.lock().store(register, value);
    }

    /// Latch interrupt status bits into `SYSINT`.
    pub fn raise_interrupt(&self, bits: u16) {
        let mut model = self.inner.lock();
        let latched = model.load(reg::SYSINT) | bits;
        model.store(reg::SYSINT, latched);
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    pub fn log(&self) -> Vec<BusOp> {
        self.inner.lock().log.clone()
    }

    /// Drain the transaction log.
    pub fn take_log(&self) -> Vec<BusOp> {
        std::mem::take(&mut self.inner.lock().log)
    }

    pub fn transaction_count(&self) -> u64 {
        self.inner.lock().transactions
    }
}

impl RegisterBus for SimulatedChip {
    fn read_register(&mut self, register: u8) -> BusResult<u16> {
        self.inner.lock().read(register)
    }

    fn write_register(&mut self, register: u8, value: u16) -> BusResult<()> {
        self.inner.lock().write(register, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_chip_reports_id() -> BusResult<()> {
        let mut chip = SimulatedChip::new();
        assert_eq!(chip.read_register(reg::ID)?, CHIP_ID);
        Ok(())
    }

    #[test]
    fn test_soft_reset_clears_registers() -> BusResult<()> {
        let mut chip = SimulatedChip::new();
        chip.write_register(reg::DRV_LVL, 0x6B)?;
        chip.write_register(reg::ID, SOFT_RESET_MAGIC)?;
        assert_eq!(chip.register(reg::DRV_LVL), 0);
        assert_eq!(chip.register(reg::ID), CHIP_ID);
        assert_eq!(chip.log().len(), 2);
        Ok(())
    }

    #[test]
    fn test_sysint_clears_on_read() -> BusResult<()> {
        let mut chip = SimulatedChip::new();
        chip.raise_interrupt(0x0020);
        assert_eq!(chip.read_register(reg::SYSINT)?, 0x0020);
        assert_eq!(chip.read_register(reg::SYSINT)?, 0);
        Ok(())
    }

    #[test]
    fn test_glb_state_follows_go() -> BusResult<()> {
        let mut chip = SimulatedChip::new().with_settle_polls(2);
        assert_eq!(chip.read_register(reg::GLB_STATE)?, 0);

        chip.write_register(reg::GO, 1)?;
        assert!(chip.is_playing());
        assert_eq!(chip.read_register(reg::GLB_STATE)?, BUSY_STATE);

        chip.write_register(reg::GO, 0)?;
        assert_eq!(chip.read_register(reg::GLB_STATE)?, BUSY_STATE);
        assert_eq!(chip.read_register(reg::GLB_STATE)?, BUSY_STATE);
        assert_eq!(chip.read_register(reg::GLB_STATE)?, 0);
        Ok(())
    }

    #[test]
    fn test_register_faults() {
        let mut chip = SimulatedChip::new();
        chip.inject(Fault::WriteTo(reg::GO));
        chip.inject(Fault::ReadOf(reg::GLB_STATE));

        assert_eq!(
            chip.write_register(reg::GO, 1),
            Err(BusError::write(reg::GO, 1, "injected fault"))
        );
        assert_eq!(
            chip.read_register(reg::GLB_STATE),
            Err(BusError::read(reg::GLB_STATE, "injected fault"))
        );
        assert!(chip.log().is_empty());

        chip.clear_faults();
        assert_eq!(chip.write_register(reg::GO, 1), Ok(()));
    }

    #[test]
    fn test_fault_after_transactions() -> BusResult<()> {
        let mut chip = SimulatedChip::new();
        chip.inject(Fault::AfterTransactions(2));
        chip.read_register(reg::ID)?;
        chip.write_register(reg::TSET, 0x11)?;
        assert!(chip.read_register(reg::ID).is_err());
        assert_eq!(chip.transaction_count(), 2);
        Ok(())
    }

    #[test]
    fn test_clones_share_state() -> BusResult<()> {
        let chip = SimulatedChip::new();
        let mut driver_side = chip.clone();
        driver_side.write_register(reg::TSET, 0x11)?;
        assert_eq!(chip.register(reg::TSET), 0x11);
        assert_eq!(chip.take_log().len(), 1);
        assert!(driver_side.log().is_empty());
        Ok(())
    }

    #[test]
    fn test_bus_op_display() {
        let op = BusOp::Write {
            register: reg::SYSINTM,
            value: 0x0020,
        };
        assert_eq!(op.to_string(), "W SYSINTM      0x0020");
        let op = BusOp::Read {
            register: 0x01,
            value: 0,
        };
        assert_eq!(op.to_string(), "R 0x1          0x0000");
    }
}
