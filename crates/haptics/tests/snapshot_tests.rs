//! Byte-level snapshots of HwN frames.

use aw8624_haptics::{DeviceMode, DeviceSettingRecord, HapticsConfig, HapticsDevice, slot};
use aw8624_haptics::wire::encode_frame;
use aw8624_protocol::SimulatedChip;
use insta::assert_snapshot;

fn hex_rows(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            format!("{:04x}: {}", row * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_snapshot_get_frame_after_set() -> Result<(), Box<dyn std::error::Error>> {
    let mut device = HapticsDevice::initialize(SimulatedChip::new(), HapticsConfig::default())?;
    let mut record = DeviceSettingRecord::vibrator(0).with_mode(DeviceMode::On);
    record.set_setting(slot::INTENSITY, 80);
    record.set_setting(slot::CYCLE_GRANULARITY, 3);
    device.set_state(&encode_frame(&[record])?)?;

    let mut output = vec![0u8; 152];
    let produced = device.get_state(&mut output, None)?;
    assert_eq!(produced, 152);
    assert_snapshot!(hex_rows(&output), @r"
    0000: 98 00 00 00 01 00 00 00 01 00 00 00 00 00 00 00
    0010: 01 00 00 00 01 00 00 00 00 00 00 00 00 00 00 00
    0020: 00 00 00 00 00 00 00 00 50 00 00 00 00 00 00 00
    0030: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0040: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0050: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0060: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0070: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0080: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
    0090: 00 00 00 00 ff ff ff ff
    ");
    Ok(())
}

#[test]
fn test_snapshot_device_information() {
    let info = aw8624_haptics::DeviceInformation::new(1);
    assert_snapshot!(hex_rows(&info.to_bytes()), @"0000: 01 00 00 00 0c 00 00 00 01 00 00 00");
}
