//! AW8624 register map.
//!
//! Addresses live in [`reg`]; each register that is programmed field-by-field
//! has its own module with typed [`Field`] descriptors and the named values the
//! driver writes into them.

/// Value read back from [`reg::ID`] on a genuine AW8624.
pub const CHIP_ID: u16 = 0x24;

/// Writing this to [`reg::ID`] soft-resets the chip.
pub const SOFT_RESET_MAGIC: u16 = 0xAA;

/// A contiguous bit field inside a 16-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub register: u8,
    pub offset: u8,
    pub width: u8,
}

impl Field {
    /// # Panics
    ///
    /// Panics if the field is empty or extends past bit 15. All fields in this
    /// module are constants, so a bad descriptor fails at compile time.
    pub const fn new(register: u8, offset: u8, width: u8) -> Self {
        assert!(width > 0 && offset as u32 + width as u32 <= 16);
        Self {
            register,
            offset,
            width,
        }
    }

    /// Single-bit field.
    pub const fn bit(register: u8, offset: u8) -> Self {
        Self::new(register, offset, 1)
    }

    /// Mask selecting the field's bits in place.
    pub const fn bits(&self) -> u16 {
        let ones = if self.width >= 16 {
            u16::MAX
        } else {
            (1u16 << self.width) - 1
        };
        ones << self.offset
    }

    /// AND-mask that clears the field and keeps every other bit.
    pub const fn clear_mask(&self) -> u16 {
        !self.bits()
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u16 {
        self.bits() >> self.offset
    }

    /// Shift `value` into position. Bits beyond the field width are dropped.
    pub const fn encode(&self, value: u16) -> u16 {
        (value << self.offset) & self.bits()
    }

    /// Extract the field from a raw register value.
    pub const fn decode(&self, raw: u16) -> u16 {
        (raw & self.bits()) >> self.offset
    }
}

/// Register addresses.
pub mod reg {
    pub const ID: u8 = 0x00;
    pub const SYSINT: u8 = 0x02;
    pub const SYSINTM: u8 = 0x03;
    pub const SYSCTRL: u8 = 0x04;
    pub const GO: u8 = 0x05;
    pub const DBGCTRL: u8 = 0x20;
    pub const DATCTRL: u8 = 0x2B;
    pub const PWMPRC: u8 = 0x2D;
    pub const PWMDBG: u8 = 0x2E;
    pub const WAVECTRL: u8 = 0x31;
    pub const SW_BRAKE: u8 = 0x3A;
    pub const PRLVL: u8 = 0x3E;
    pub const GLB_STATE: u8 = 0x46;
    pub const CONT_CTRL: u8 = 0x48;
    pub const F_PRE_H: u8 = 0x49;
    pub const F_PRE_L: u8 = 0x4A;
    pub const TD_H: u8 = 0x4B;
    pub const TD_L: u8 = 0x4C;
    pub const TSET: u8 = 0x4D;
    pub const THRS_BRA_END: u8 = 0x4E;
    pub const TRIM_LRA: u8 = 0x5B;
    pub const R_SPARE: u8 = 0x5D;
    pub const DETCTRL: u8 = 0x5F;
    pub const ADCTEST: u8 = 0x66;
    pub const ZC_THRSH_H: u8 = 0x74;
    pub const ZC_THRSH_L: u8 = 0x75;
    pub const BEMF_VTHH_H: u8 = 0x76;
    pub const BEMF_VTHH_L: u8 = 0x77;
    pub const BEMF_VTHL_H: u8 = 0x78;
    pub const BEMF_VTHL_L: u8 = 0x79;
    pub const BEMF_NUM: u8 = 0x7A;
    pub const TIME_NZC: u8 = 0x7C;
    pub const DRV_LVL: u8 = 0x7D;
    pub const DRV_LVL_OV: u8 = 0x7E;

    /// Human-readable name of a mapped register, for traces and logs.
    pub fn name(register: u8) -> Option<&'static str> {
        let name = match register {
            ID => "ID",
            SYSINT => "SYSINT",
            SYSINTM => "SYSINTM",
            SYSCTRL => "SYSCTRL",
            GO => "GO",
            DBGCTRL => "DBGCTRL",
            DATCTRL => "DATCTRL",
            PWMPRC => "PWMPRC",
            PWMDBG => "PWMDBG",
            WAVECTRL => "WAVECTRL",
            SW_BRAKE => "SW_BRAKE",
            PRLVL => "PRLVL",
            GLB_STATE => "GLB_STATE",
            CONT_CTRL => "CONT_CTRL",
            F_PRE_H => "F_PRE_H",
            F_PRE_L => "F_PRE_L",
            TD_H => "TD_H",
            TD_L => "TD_L",
            TSET => "TSET",
            THRS_BRA_END => "THRS_BRA_END",
            TRIM_LRA => "TRIM_LRA",
            R_SPARE => "R_SPARE",
            DETCTRL => "DETCTRL",
            ADCTEST => "ADCTEST",
            ZC_THRSH_H => "ZC_THRSH_H",
            ZC_THRSH_L => "ZC_THRSH_L",
            BEMF_VTHH_H => "BEMF_VTHH_H",
            BEMF_VTHH_L => "BEMF_VTHH_L",
            BEMF_VTHL_H => "BEMF_VTHL_H",
            BEMF_VTHL_L => "BEMF_VTHL_L",
            BEMF_NUM => "BEMF_NUM",
            TIME_NZC => "TIME_NZC",
            DRV_LVL => "DRV_LVL",
            DRV_LVL_OV => "DRV_LVL_OV",
            _ => return None,
        };
        Some(name)
    }
}

/// Interrupt mask (1 = masked).
pub mod sysintm {
    use super::{Field, reg};

    pub const UVLO: Field = Field::bit(reg::SYSINTM, 5);
    pub const OCD: Field = Field::bit(reg::SYSINTM, 2);
    pub const OT: Field = Field::bit(reg::SYSINTM, 1);

    pub const MASKED: u16 = 1;
    pub const UNMASKED: u16 = 0;
}

pub mod sysctrl {
    use super::{Field, reg};

    pub const PLAY_MODE: Field = Field::new(reg::SYSCTRL, 2, 2);
    pub const PLAY_MODE_RAM: u16 = 0;
    pub const PLAY_MODE_CONT: u16 = 2;

    pub const WORK_MODE: Field = Field::bit(reg::SYSCTRL, 0);
    pub const WORK_MODE_ACTIVE: u16 = 0;
    pub const WORK_MODE_STANDBY: u16 = 1;
}

pub mod go {
    use super::{Field, reg};

    pub const GO: Field = Field::bit(reg::GO, 0);
}

pub mod dbgctrl {
    use super::{Field, reg};

    pub const INT_MODE: Field = Field::bit(reg::DBGCTRL, 3);
    pub const INT_MODE_LEVEL: u16 = 0;
    pub const INT_MODE_EDGE: u16 = 1;

    pub const INTN_TRG_SEL: Field = Field::bit(reg::DBGCTRL, 2);
}

pub mod datctrl {
    use super::{Field, reg};

    /// Low-pass filter corner: 0 = 500 Hz, 1 = 1000 Hz.
    pub const FC: Field = Field::bit(reg::DATCTRL, 6);
    pub const FC_1000HZ: u16 = 1;

    pub const LPF_EN: Field = Field::bit(reg::DATCTRL, 5);
}

pub mod pwmprc {
    use super::{Field, reg};

    pub const PRC_EN: Field = Field::bit(reg::PWMPRC, 7);
}

pub mod pwmdbg {
    use super::{Field, reg};

    pub const PWM_MODE: Field = Field::new(reg::PWMDBG, 5, 2);
    pub const PWM_MODE_48K: u16 = 0;
    pub const PWM_MODE_24K: u16 = 3;
}

pub mod wavectrl {
    use super::{Field, reg};

    pub const NUM_OV_DRIVER: Field = Field::new(reg::WAVECTRL, 4, 4);
}

pub mod prlvl {
    use super::{Field, reg};

    pub const PR_EN: Field = Field::bit(reg::PRLVL, 7);
}

pub mod glb_state {
    use super::{Field, reg};

    pub const STATE: Field = Field::new(reg::GLB_STATE, 0, 4);
    pub const STANDBY: u16 = 0;
}

/// Continuous-drive control.
pub mod cont_ctrl {
    use super::{Field, reg};

    pub const ZC_DETECT: Field = Field::bit(reg::CONT_CTRL, 7);
    pub const WAIT_PERIOD: Field = Field::new(reg::CONT_CTRL, 5, 2);
    pub const WAIT_1PERIOD: u16 = 0;

    pub const MODE: Field = Field::bit(reg::CONT_CTRL, 4);
    pub const MODE_BY_GO: u16 = 0;

    pub const EN_CLOSE: Field = Field::bit(reg::CONT_CTRL, 3);
    pub const CLOSE_PLAYBACK: u16 = 1;

    pub const F0_DETECT: Field = Field::bit(reg::CONT_CTRL, 2);
    pub const O2C: Field = Field::bit(reg::CONT_CTRL, 1);
    pub const AUTO_BRK: Field = Field::bit(reg::CONT_CTRL, 0);
}

pub mod r_spare {
    use super::{Field, reg};

    pub const CALI_EN: Field = Field::bit(reg::R_SPARE, 7);
}

pub mod detctrl {
    use super::{Field, reg};

    pub const PROTECT: Field = Field::bit(reg::DETCTRL, 6);
    pub const PROTECT_NO_ACTION: u16 = 1;
}

pub mod adctest {
    use super::{Field, reg};

    pub const VBAT_MODE: Field = Field::bit(reg::ADCTEST, 6);
    pub const VBAT_MODE_HW: u16 = 1;
}

pub mod bemf_num {
    use super::{Field, reg};

    pub const BRK_NUM: Field = Field::new(reg::BEMF_NUM, 0, 4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bit_field_masks() {
        assert_eq!(sysintm::UVLO.bits(), 0x0020);
        assert_eq!(sysintm::UVLO.clear_mask(), 0xFFDF);
        assert_eq!(go::GO.encode(1), 0x0001);
    }

    #[test]
    fn test_multi_bit_field_masks() {
        assert_eq!(sysctrl::PLAY_MODE.bits(), 0x000C);
        assert_eq!(sysctrl::PLAY_MODE.encode(sysctrl::PLAY_MODE_CONT), 0x0008);
        assert_eq!(pwmdbg::PWM_MODE.encode(pwmdbg::PWM_MODE_24K), 0x0060);
        assert_eq!(wavectrl::NUM_OV_DRIVER.clear_mask(), 0xFF0F);
        assert_eq!(cont_ctrl::WAIT_PERIOD.bits(), 0x0060);
        assert_eq!(bemf_num::BRK_NUM.max_value(), 15);
    }

    #[test]
    fn test_zero_valued_modes_clear_their_fields() {
        assert_eq!(dbgctrl::INT_MODE.encode(dbgctrl::INT_MODE_LEVEL), 0);
        assert_eq!(dbgctrl::INT_MODE.decode(0x0008), dbgctrl::INT_MODE_EDGE);
        assert_eq!(pwmdbg::PWM_MODE.encode(pwmdbg::PWM_MODE_48K), 0);
        assert_eq!(pwmdbg::PWM_MODE.decode(0x009F), pwmdbg::PWM_MODE_48K);
    }

    #[test]
    fn test_encode_truncates_to_width() {
        assert_eq!(bemf_num::BRK_NUM.encode(0x13), 0x0003);
        assert_eq!(go::GO.encode(2), 0);
    }

    #[test]
    fn test_decode_extracts_field() {
        assert_eq!(glb_state::STATE.decode(0x00F8), 0x08);
        assert_eq!(sysctrl::PLAY_MODE.decode(0x0009), sysctrl::PLAY_MODE_CONT);
    }

    #[test]
    fn test_full_width_field() {
        let f = Field::new(reg::TD_H, 0, 16);
        assert_eq!(f.bits(), 0xFFFF);
        assert_eq!(f.clear_mask(), 0);
        assert_eq!(f.encode(0xBEEF), 0xBEEF);
    }

    #[test]
    fn test_register_names() {
        assert_eq!(reg::name(reg::GLB_STATE), Some("GLB_STATE"));
        assert_eq!(reg::name(reg::BEMF_VTHL_L), Some("BEMF_VTHL_L"));
        assert_eq!(reg::name(0x01), None);
    }
}
