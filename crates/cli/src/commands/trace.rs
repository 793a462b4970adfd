//! Register trace of a single transition against a simulated chip.

use anyhow::Result;
use aw8624_haptics::HapticsConfig;
use aw8624_protocol::{Aw8624, ProtocolResult, RegisterBus, SimulatedChip};
use clap::ValueEnum;
use std::fmt;
use tracing::info;

use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transition {
    Initialize,
    Standby,
    Activate,
    RamMode,
    Start,
    Stop,
    Vibrate,
}

impl Transition {
    pub fn run<B: RegisterBus>(self, chip: &mut Aw8624<B>) -> ProtocolResult<()> {
        match self {
            Transition::Initialize => chip.initialize(),
            Transition::Standby => chip.standby(),
            Transition::Activate => chip.activate(),
            Transition::RamMode => chip.ram_mode(),
            Transition::Start => chip.start(),
            Transition::Stop => chip.stop(),
            Transition::Vibrate => chip.vibrate_continuous(),
        }
    }

    /// Stop is traced while the chip is vibrating so the idle poll has
    /// something to wait for.
    fn needs_playback(self) -> bool {
        matches!(self, Transition::Stop)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Initialize => "initialize",
            Transition::Standby => "standby",
            Transition::Activate => "activate",
            Transition::RamMode => "ram-mode",
            Transition::Start => "start",
            Transition::Stop => "stop",
            Transition::Vibrate => "vibrate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceOptions {
    /// Busy `GLB_STATE` reads the simulator reports after `GO` drops.
    pub settle_polls: u32,
    /// Keep `GLB_STATE` busy for the traced transition.
    pub stuck: bool,
}

pub fn execute(
    config: &HapticsConfig,
    transition: Transition,
    options: TraceOptions,
    json: bool,
) -> Result<()> {
    let sim = SimulatedChip::new().with_settle_polls(options.settle_polls);
    let mut chip = Aw8624::new(sim.clone(), config.driver.clone()).map_err(CliError::from)?;

    if transition != Transition::Initialize {
        chip.initialize().map_err(CliError::from)?;
    }
    if transition.needs_playback() {
        chip.vibrate_continuous().map_err(CliError::from)?;
    }
    sim.take_log();
    sim.set_stuck_busy(options.stuck);

    info!(%transition, settle_polls = options.settle_polls, stuck = options.stuck, "tracing");
    let outcome = transition.run(&mut chip);
    let operations = sim.take_log();

    match outcome {
        Ok(()) => output::print_trace(transition, chip.state(), &operations, json),
        Err(e) => {
            if !json {
                output::print_partial_trace(transition, &operations);
            }
            Err(CliError::from(e).into())
        }
    }
}
