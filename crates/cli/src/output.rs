//! Output formatting for CLI responses

use anyhow::{Error, Result};
use aw8624_haptics::{DeviceMode, DeviceSettingRecord, DeviceType, slot};
use aw8624_protocol::{BusOp, ChipState, PollExhaustion};
use colored::*;
use serde::Serialize;
use serde_json::json;

use crate::commands::batch::BatchReport;
use crate::commands::profile::ProfileReport;
use crate::commands::trace::Transition;
use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidConfiguration(_)) => "invalid_configuration",
        Some(CliError::UnsupportedFormat(_)) => "unsupported_format",
        Some(CliError::Request(e)) if e.is_request_error() => "request_rejected",
        Some(CliError::Request(_)) => "request_failed",
        Some(CliError::Driver(_)) => "driver",
        Some(CliError::IoError(_)) => "io",
        Some(CliError::JsonError(_)) => "json",
        Some(CliError::YamlError(_)) => "yaml",
        None => "unknown",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::from)?;
    println!("{}", text);
    Ok(())
}

fn exhaustion_name(policy: PollExhaustion) -> &'static str {
    match policy {
        PollExhaustion::Report => "report",
        PollExhaustion::Ignore => "ignore",
    }
}

fn type_name(device_type: DeviceType) -> String {
    match device_type {
        DeviceType::Led => "led".to_string(),
        DeviceType::Vibrator => "vibrator".to_string(),
        DeviceType::Other(raw) => format!("type({raw})"),
    }
}

/// Hex dump with 16 bytes per row, each row prefixed by its offset.
pub fn hex_rows(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{byte:02x}")).collect();
            format!("{:04x}: {}", row * 16, bytes.join(" "))
        })
        .collect()
}

/// Print the effective calibration profile
pub fn print_profile(report: &ProfileReport<'_>, json: bool) -> Result<()> {
    if json {
        return print_json(&json!({
            "success": true,
            "profile": report,
        }));
    }

    let calibration = report.calibration;
    let derived = &report.derived;
    println!("{}", "Calibration profile".bold());
    println!("  Devices:          {}", report.device_count);
    println!(
        "  Poll limit:       {} ({} on exhaustion)",
        report.poll_limit,
        exhaustion_name(report.poll_exhaustion)
    );
    println!(
        "  F0 pre-divider:   {:#06x} (F_PRE_H {:#04x}, F_PRE_L {:#04x})",
        derived.f0_pre_divider, derived.f_pre_h, derived.f_pre_l
    );
    println!(
        "  Trigger delay:    {:#06x} (TD_H {:#04x}, TD_L {:#04x})",
        calibration.cont_td, derived.td_h, derived.td_l
    );
    println!(
        "  Zero-cross:       {:#06x} (ZC_THRSH_H {:#04x}, ZC_THRSH_L {:#04x})",
        calibration.cont_zc_threshold, derived.zc_thrsh_h, derived.zc_thrsh_l
    );
    println!("  Brake count:      {}", calibration.cont_brake_count);
    println!("  Drive level:      {:#04x}", calibration.drive_level);
    println!("  Overdrive level:  {:#04x}", calibration.overdrive_level);
    println!("  Software brake:   {:#04x}", calibration.sw_brake);
    println!("  TSET:             {:#04x}", calibration.tset);
    println!("  Time NZC:         {:#04x}", calibration.time_nzc);
    let [vthh_h, vthh_l, vthl_h, vthl_l] = calibration.bemf_thresholds;
    println!(
        "  BEMF thresholds:  {:#04x} {:#04x} {:#04x} {:#04x}",
        vthh_h, vthh_l, vthl_h, vthl_l
    );
    Ok(())
}

/// Print the transactions of a completed transition
pub fn print_trace(
    transition: Transition,
    state: ChipState,
    operations: &[BusOp],
    json: bool,
) -> Result<()> {
    if json {
        return print_json(&json!({
            "success": true,
            "transition": transition.to_string(),
            "state": state.to_string(),
            "count": operations.len(),
            "operations": operations,
        }));
    }

    println!(
        "{} {} operation(s), chip now {}",
        format!("{transition}:").bold(),
        operations.len(),
        state.to_string().green()
    );
    print_operations(operations);
    Ok(())
}

/// Print what a failed transition managed to do before it aborted
pub fn print_partial_trace(transition: Transition, operations: &[BusOp]) {
    println!(
        "{} {} operation(s) before failure",
        format!("{transition}:").bold(),
        operations.len()
    );
    print_operations(operations);
}

fn print_operations(operations: &[BusOp]) {
    for op in operations {
        let line = format!("  {op}");
        if op.is_write() {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
}

/// Print the outcome of a batch set/get
pub fn print_batch(report: &BatchReport, hex: bool, json: bool) -> Result<()> {
    if json {
        let frame = hex.then(|| hex_rows(&report.frame));
        return print_json(&json!({
            "success": true,
            "consumed": report.consumed,
            "produced": report.produced,
            "records": report.records,
            "frame": frame,
        }));
    }

    println!(
        "Applied {} record(s): set consumed {} bytes, get returned {} bytes",
        report.records.len(),
        report.consumed,
        report.produced
    );
    for record in &report.records {
        print_record(record);
    }
    if hex {
        for row in hex_rows(&report.frame) {
            println!("  {}", row.dimmed());
        }
    }
    Ok(())
}

fn print_record(record: &DeviceSettingRecord) {
    let bullet = match record.mode {
        DeviceMode::On => "●".green(),
        DeviceMode::Off => "●".dimmed(),
        _ => "●".yellow(),
    };
    println!(
        "  {} device {}  {}  {}  intensity {}",
        bullet,
        record.id,
        type_name(record.device_type),
        record.mode,
        record.setting(slot::INTENSITY).unwrap_or_default()
    );
}
