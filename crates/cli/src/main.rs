//! hapticsctl - AW8624 haptics diagnostic CLI
//!
//! Drives the driver and the HwN request layer against a simulated chip, so
//! calibration profiles, register sequences and batch request files can be
//! inspected without hardware.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::trace::{TraceOptions, Transition};
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "hapticsctl")]
#[command(about = "AW8624 haptics diagnostics - inspect profiles, register traces and HwN requests")]
#[command(version)]
#[command(long_about = "
hapticsctl exercises the AW8624 haptics stack against a simulated chip.
It prints the effective calibration profile, the exact register traffic of
each driver transition, and the result of dispatching HwN set/get frames
built from a request file.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (.json, .yaml or .yml)
    #[arg(short, long, global = true, env = "HAPTICSCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the effective calibration profile and derived register values
    Profile,

    /// Print the register trace of one driver transition
    Trace {
        /// Transition to trace
        #[arg(value_enum)]
        transition: Transition,

        /// Busy GLB_STATE reads the simulated chip reports after GO drops
        #[arg(long, default_value_t = 0)]
        settle_polls: u32,

        /// Keep the simulated chip busy so Stop exhausts its poll budget
        #[arg(long)]
        stuck: bool,
    },

    /// Dispatch device records from a file and print the resulting get frame
    Batch {
        /// Request file holding a list of device setting records
        file: PathBuf,

        /// Also dump the returned frame in hex
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("hapticsctl={log_level},aw8624_protocol={log_level},aw8624_haptics={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(exit_code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Profile => commands::profile::execute(&config, cli.json),
        Commands::Trace {
            transition,
            settle_polls,
            stuck,
        } => {
            let options = TraceOptions {
                settle_polls: *settle_polls,
                stuck: *stuck,
            };
            commands::trace::execute(&config, *transition, options, cli.json)
        }
        Commands::Batch { file, hex } => {
            commands::batch::execute(&config, file, *hex, cli.json)
        }
    }
}
