//! Property-based tests for field writes, Stop polling and calibration.

use aw8624_protocol::registers::{
    Field, bemf_num, cont_ctrl, datctrl, pwmdbg, reg, sysctrl, sysintm, wavectrl,
};
use aw8624_protocol::{
    Aw8624, CalibrationProfile, ChipState, DriverConfig, ProtocolError, RegisterBus,
    SimulatedChip,
};
use proptest::prelude::*;

const FIELDS: [Field; 8] = [
    sysintm::UVLO,
    sysctrl::PLAY_MODE,
    sysctrl::WORK_MODE,
    datctrl::FC,
    pwmdbg::PWM_MODE,
    wavectrl::NUM_OV_DRIVER,
    cont_ctrl::WAIT_PERIOD,
    bemf_num::BRK_NUM,
];

#[derive(Debug, Clone, Copy)]
enum Transition {
    Standby,
    Activate,
    RamMode,
    Start,
    Stop,
    VibrateContinuous,
}

fn transition() -> impl Strategy<Value = Transition> {
    prop_oneof![
        Just(Transition::Standby),
        Just(Transition::Activate),
        Just(Transition::RamMode),
        Just(Transition::Start),
        Just(Transition::Stop),
        Just(Transition::VibrateContinuous),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_write_field_leaves_other_bits(
        index in 0usize..FIELDS.len(),
        initial in any::<u16>(),
        value in any::<u16>(),
    ) {
        let field = FIELDS.get(index).copied().unwrap_or(sysintm::UVLO);
        let chip = SimulatedChip::new();
        chip.set_register(field.register, initial);
        let mut aw = Aw8624::new(chip.clone(), DriverConfig::default())?;

        aw.write_field(field, value)?;

        let written = chip.register(field.register);
        prop_assert_eq!(written & field.clear_mask(), initial & field.clear_mask());
        prop_assert_eq!(field.decode(written), value & field.max_value());
    }

    #[test]
    fn prop_stop_poll_count_is_bounded(settle in 0u32..40, limit in 1u32..30) {
        let chip = SimulatedChip::new().with_settle_polls(settle);
        let config = DriverConfig::builder().poll_limit(limit).build()?;
        let mut aw = Aw8624::new(chip.clone(), config)?;
        let mut bus = chip.clone();
        bus.write_register(reg::GO, 1)?;
        chip.take_log();

        let result = aw.stop();

        let polls = chip
            .log()
            .iter()
            .filter(|op| !op.is_write() && op.register() == reg::GLB_STATE)
            .count();
        let expected = settle.saturating_add(1).min(limit);
        prop_assert_eq!(polls, usize::try_from(expected)?);
        prop_assert_eq!(result.is_ok(), settle < limit);
        if let Err(err) = result {
            let is_poll_timeout = matches!(err, ProtocolError::PollTimeout { .. });
            prop_assert!(is_poll_timeout);
        }
        prop_assert_eq!(aw.state(), ChipState::Standby);
    }

    #[test]
    fn prop_pre_divider_matches_truncating_division(
        f0_pre in 1000u32..4000,
        f0_coeff in 100u32..500,
    ) {
        let profile = CalibrationProfile {
            f0_pre,
            f0_coeff,
            ..CalibrationProfile::default()
        };
        let expected = 1_000_000_000u64 / u64::from(f0_pre) / u64::from(f0_coeff);
        prop_assert_eq!(u64::from(profile.pre_divider()?), expected);
    }

    #[test]
    fn prop_transitions_only_touch_mapped_registers(
        steps in proptest::collection::vec(transition(), 1..12),
    ) {
        let chip = SimulatedChip::new();
        let mut aw = Aw8624::new(chip.clone(), DriverConfig::default())?;
        aw.initialize()?;

        for step in steps {
            match step {
                Transition::Standby => aw.standby()?,
                Transition::Activate => aw.activate()?,
                Transition::RamMode => aw.ram_mode()?,
                Transition::Start => aw.start()?,
                Transition::Stop => aw.stop()?,
                Transition::VibrateContinuous => aw.vibrate_continuous()?,
            }
        }

        for op in chip.log() {
            prop_assert!(reg::name(op.register()).is_some(), "unmapped register in {}", op);
        }
    }
}
