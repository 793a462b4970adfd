//! AW8624 state transitions.
//!
//! Every transition is a fixed, ordered sequence of register reads, raw writes
//! and masked read-modify-writes. The first failing bus transaction aborts the
//! transition; nothing already written is rolled back.

use crate::bus::RegisterBus;
use crate::calibration::CalibrationProfile;
use crate::config::{DriverConfig, PollExhaustion};
use crate::error::{ProtocolError, ProtocolResult};
use crate::poll::{BusyWait, PollDelay};
use crate::registers::{
    CHIP_ID, Field, SOFT_RESET_MAGIC, adctest, bemf_num, cont_ctrl, datctrl, dbgctrl, detctrl,
    glb_state, go, prlvl, pwmdbg, pwmprc, r_spare, reg, sysctrl, sysintm, wavectrl,
};
use std::fmt;
use tracing::{debug, info, warn};

/// Last physical configuration commanded through this driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChipState {
    /// Not initialized yet, or a bus transaction failed mid-transition.
    #[default]
    Unknown,
    Standby,
    ActiveRam,
    ActiveContinuous,
}

impl fmt::Display for ChipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChipState::Unknown => "unknown",
            ChipState::Standby => "standby",
            ChipState::ActiveRam => "active-ram",
            ChipState::ActiveContinuous => "active-continuous",
        };
        f.write_str(name)
    }
}

/// Register-level driver for one AW8624 on a [`RegisterBus`].
pub struct Aw8624<B: RegisterBus> {
    bus: B,
    config: DriverConfig,
    delay: Box<dyn PollDelay>,
    state: ChipState,
    play_mode: u16,
    pre_divider: u16,
}

impl<B: RegisterBus> fmt::Debug for Aw8624<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aw8624")
            .field("state", &self.state)
            .field("poll_limit", &self.config.poll_limit)
            .field("poll_exhaustion", &self.config.poll_exhaustion)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<B: RegisterBus> Aw8624<B> {
    /// Wrap a bus. No register is touched until a transition runs.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(bus: B, config: DriverConfig) -> ProtocolResult<Self> {
        config.validate()?;
        let pre_divider = config.calibration.pre_divider()?;
        Ok(Self {
            bus,
            config,
            delay: Box::new(BusyWait::default()),
            state: ChipState::Unknown,
            play_mode: sysctrl::PLAY_MODE_RAM,
            pre_divider,
        })
    }

    /// Replace the pause used between `GLB_STATE` polls.
    #[must_use]
    pub fn with_poll_delay(mut self, delay: impl PollDelay + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    #[must_use]
    pub fn with_boxed_poll_delay(mut self, delay: Box<dyn PollDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn state(&self) -> ChipState {
        self.state
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationProfile {
        &self.config.calibration
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    pub fn read_register(&mut self, register: u8) -> ProtocolResult<u16> {
        Ok(self.bus.read_register(register)?)
    }

    pub fn write_register(&mut self, register: u8, value: u16) -> ProtocolResult<()> {
        Ok(self.bus.write_register(register, value)?)
    }

    /// Read-modify-write: `new = (old & mask) | value`.
    pub fn write_bits(&mut self, register: u8, mask: u16, value: u16) -> ProtocolResult<()> {
        let old = self.read_register(register)?;
        self.write_register(register, (old & mask) | value)
    }

    /// Replace one field, leaving the rest of the register untouched.
    pub fn write_field(&mut self, field: Field, value: u16) -> ProtocolResult<()> {
        self.write_bits(field.register, field.clear_mask(), field.encode(value))
    }

    /// Low byte of the `ID` register.
    pub fn chip_id(&mut self) -> ProtocolResult<u8> {
        let [low, _] = self.read_register(reg::ID)?.to_le_bytes();
        Ok(low)
    }

    /// Soft reset and full baseline programming. Ends in standby.
    ///
    /// The baseline Stop never fails on poll exhaustion, whatever
    /// [`DriverConfig::poll_exhaustion`] says.
    pub fn initialize(&mut self) -> ProtocolResult<()> {
        self.state = ChipState::Unknown;
        let result = self.initialize_sequence();
        self.track(result)
    }

    pub fn standby(&mut self) -> ProtocolResult<()> {
        let result = self.standby_sequence();
        self.track(result)
    }

    pub fn activate(&mut self) -> ProtocolResult<()> {
        let result = self.activate_sequence();
        self.track(result)
    }

    /// Select RAM playback and activate.
    pub fn ram_mode(&mut self) -> ProtocolResult<()> {
        let result = self.ram_mode_sequence();
        self.track(result)
    }

    /// Activate and raise the GO trigger.
    pub fn start(&mut self) -> ProtocolResult<()> {
        let result = self.start_sequence();
        self.track(result)
    }

    /// Clear GO, wait for the playback engine to go idle, then enter standby.
    ///
    /// Standby is entered even when the chip never reports idle. What happens
    /// next depends on [`DriverConfig::poll_exhaustion`].
    pub fn stop(&mut self) -> ProtocolResult<()> {
        let result = self.stop_sequence();
        self.track(result)
    }

    /// Closed-loop continuous drive until [`stop`](Self::stop).
    pub fn vibrate_continuous(&mut self) -> ProtocolResult<()> {
        let result = self.vibrate_continuous_sequence();
        self.track(result)
    }

    fn track<T>(&mut self, result: ProtocolResult<T>) -> ProtocolResult<T> {
        if let Err(ProtocolError::Bus(err)) = &result {
            warn!(register = err.register(), "bus failure, chip state unknown: {err}");
            self.state = ChipState::Unknown;
        }
        result
    }

    fn initialize_sequence(&mut self) -> ProtocolResult<()> {
        let id = self.chip_id()?;
        if u16::from(id) == CHIP_ID {
            info!("AW8624 chip id {id:#04x}");
        } else {
            warn!("unexpected chip id {id:#04x}, expected {CHIP_ID:#04x}");
        }

        self.write_register(reg::ID, SOFT_RESET_MAGIC)?;
        self.setup_interrupts()?;
        self.baseline()?;
        self.program_calibration()?;

        info!("AW8624 initialized");
        Ok(())
    }

    fn setup_interrupts(&mut self) -> ProtocolResult<()> {
        debug!("configuring interrupts");
        // Reading SYSINT clears anything latched before reset.
        self.read_register(reg::SYSINT)?;
        self.write_field(dbgctrl::INT_MODE, dbgctrl::INT_MODE_EDGE)?;
        self.write_field(sysintm::UVLO, sysintm::UNMASKED)?;
        self.write_field(sysintm::OCD, sysintm::UNMASKED)?;
        self.write_field(sysintm::OT, sysintm::UNMASKED)
    }

    fn baseline(&mut self) -> ProtocolResult<()> {
        debug!("programming baseline");
        self.standby_sequence()?;
        self.write_field(pwmdbg::PWM_MODE, pwmdbg::PWM_MODE_24K)?;
        self.write_field(detctrl::PROTECT, detctrl::PROTECT_NO_ACTION)?;
        self.write_field(pwmprc::PRC_EN, 0)?;
        self.write_field(prlvl::PR_EN, 0)?;
        self.write_field(adctest::VBAT_MODE, adctest::VBAT_MODE_HW)?;
        self.write_field(r_spare::CALI_EN, 1)?;
        self.write_register(reg::TRIM_LRA, 0)?;
        self.standby_sequence()?;
        self.ram_mode_sequence()?;
        // Calibration must still be programmed when the engine never idles.
        self.stop_sequence_with(PollExhaustion::Ignore)
    }

    fn program_calibration(&mut self) -> ProtocolResult<()> {
        let cal = self.config.calibration.clone();
        let (zc_high, zc_low) = CalibrationProfile::split(cal.cont_zc_threshold);
        let [vthh_h, vthh_l, vthl_h, vthl_l] = cal.bemf_thresholds;

        self.write_register(reg::SW_BRAKE, cal.sw_brake.into())?;
        self.write_register(reg::THRS_BRA_END, cal.brake_end_threshold.into())?;
        self.write_field(wavectrl::NUM_OV_DRIVER, 0)?;
        self.write_register(reg::ZC_THRSH_L, zc_low)?;
        self.write_register(reg::ZC_THRSH_H, zc_high)?;
        self.write_register(reg::TSET, cal.tset.into())?;
        self.write_register(reg::BEMF_VTHH_H, vthh_h.into())?;
        self.write_register(reg::BEMF_VTHH_L, vthh_l.into())?;
        self.write_register(reg::BEMF_VTHL_H, vthl_h.into())?;
        self.write_register(reg::BEMF_VTHL_L, vthl_l.into())
    }

    fn standby_sequence(&mut self) -> ProtocolResult<()> {
        debug!("standby");
        self.write_field(sysintm::UVLO, sysintm::MASKED)?;
        self.write_field(sysctrl::WORK_MODE, sysctrl::WORK_MODE_STANDBY)?;
        self.write_field(dbgctrl::INTN_TRG_SEL, 1)?;
        self.state = ChipState::Standby;
        Ok(())
    }

    fn activate_sequence(&mut self) -> ProtocolResult<()> {
        debug!("activate");
        self.write_field(sysctrl::WORK_MODE, sysctrl::WORK_MODE_ACTIVE)?;
        self.read_register(reg::SYSINT)?;
        self.write_field(sysintm::UVLO, sysintm::UNMASKED)?;
        self.state = if self.play_mode == sysctrl::PLAY_MODE_CONT {
            ChipState::ActiveContinuous
        } else {
            ChipState::ActiveRam
        };
        Ok(())
    }

    fn set_play_mode(&mut self, mode: u16) -> ProtocolResult<()> {
        self.write_field(sysctrl::PLAY_MODE, mode)?;
        self.play_mode = mode;
        Ok(())
    }

    fn ram_mode_sequence(&mut self) -> ProtocolResult<()> {
        debug!("ram mode");
        self.set_play_mode(sysctrl::PLAY_MODE_RAM)?;
        self.activate_sequence()
    }

    fn start_sequence(&mut self) -> ProtocolResult<()> {
        debug!("start");
        self.activate_sequence()?;
        self.write_field(go::GO, 1)
    }

    fn stop_sequence(&mut self) -> ProtocolResult<()> {
        self.stop_sequence_with(self.config.poll_exhaustion)
    }

    fn stop_sequence_with(&mut self, policy: PollExhaustion) -> ProtocolResult<()> {
        debug!("stop");
        self.write_field(go::GO, 0)?;

        let limit = self.config.poll_limit;
        let mut last_state = 0;
        let mut idle = false;
        for attempt in 1..=limit {
            last_state = self.read_register(reg::GLB_STATE)?;
            if glb_state::STATE.decode(last_state) == glb_state::STANDBY {
                idle = true;
                break;
            }
            if attempt < limit {
                self.delay.pause(attempt);
            }
        }

        self.standby_sequence()?;

        if idle {
            return Ok(());
        }
        match policy {
            PollExhaustion::Report => {
                warn!(
                    iterations = limit,
                    last_state, "chip did not go idle after stop"
                );
                Err(ProtocolError::PollTimeout {
                    iterations: limit,
                    last_state,
                })
            }
            PollExhaustion::Ignore => {
                warn!(
                    iterations = limit,
                    last_state, "chip did not go idle after stop, continuing"
                );
                Ok(())
            }
        }
    }

    fn vibrate_continuous_sequence(&mut self) -> ProtocolResult<()> {
        debug!("vibrate continuous");
        let cal = self.config.calibration.clone();
        let (pre_high, pre_low) = CalibrationProfile::split(self.pre_divider);
        let (td_high, td_low) = CalibrationProfile::split(cal.cont_td);
        let (zc_high, zc_low) = CalibrationProfile::split(cal.cont_zc_threshold);

        self.set_play_mode(sysctrl::PLAY_MODE_CONT)?;
        self.activate_sequence()?;

        self.write_register(reg::F_PRE_H, pre_high)?;
        self.write_register(reg::F_PRE_L, pre_low)?;

        self.write_field(datctrl::FC, datctrl::FC_1000HZ)?;
        self.write_field(datctrl::LPF_EN, 1)?;
        self.write_field(cont_ctrl::ZC_DETECT, 1)?;
        self.write_field(cont_ctrl::WAIT_PERIOD, cont_ctrl::WAIT_1PERIOD)?;
        self.write_field(cont_ctrl::MODE, cont_ctrl::MODE_BY_GO)?;
        self.write_field(cont_ctrl::EN_CLOSE, cont_ctrl::CLOSE_PLAYBACK)?;
        self.write_field(cont_ctrl::F0_DETECT, 0)?;
        self.write_field(cont_ctrl::O2C, 0)?;
        self.write_field(cont_ctrl::AUTO_BRK, 1)?;

        self.write_register(reg::TD_H, td_high)?;
        self.write_register(reg::TD_L, td_low)?;
        self.write_register(reg::TSET, cal.tset.into())?;
        self.write_register(reg::ZC_THRSH_H, zc_high)?;
        self.write_register(reg::ZC_THRSH_L, zc_low)?;
        self.write_field(bemf_num::BRK_NUM, cal.cont_brake_count.into())?;
        self.write_register(reg::TIME_NZC, cal.time_nzc.into())?;
        self.write_register(reg::DRV_LVL, cal.drive_level.into())?;
        self.write_register(reg::DRV_LVL_OV, cal.overdrive_level.into())?;

        self.write_field(go::GO, 1)
    }
}
