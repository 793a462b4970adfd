//! HwN get/set payload framing.
//!
//! ```text
//! Header:  { payload_size: u32, payload_version: u32, record_count: u32 }   12 bytes
//! Record:  { id: u32, device_type: u32, mode: u32, settings: u32[32] }     140 bytes
//! ```
//!
//! All fields are little-endian.

use crate::error::{HwnError, HwnResult};
use crate::record::{DeviceMode, DeviceSettingRecord, DeviceType, SETTINGS_COUNT};

pub const HEADER_SIZE: usize = 12;
pub const RECORD_SIZE: usize = 12 + SETTINGS_COUNT * 4;
pub const PAYLOAD_VERSION: u32 = 1;

/// Version reported by the device-information query.
pub const DEVICE_INFORMATION_VERSION: u32 = 1;
pub const DEVICE_INFORMATION_SIZE: u32 = 12;

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn write_u32s(out: &mut [u8], values: impl IntoIterator<Item = u32>) {
    for (chunk, value) in out.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
}

fn count_to_u32(count: usize) -> HwnResult<u32> {
    u32::try_from(count).map_err(|_| HwnError::invalid_parameter("record count exceeds u32"))
}

/// Validate a get/set frame length and return its record count.
///
/// # Errors
///
/// Returns [`HwnError::InvalidBufferSize`] unless `length` is a header
/// followed by one or more whole records.
pub fn validate_frame(length: usize) -> HwnResult<usize> {
    if length <= HEADER_SIZE {
        return Err(HwnError::invalid_buffer_size(
            length,
            "frame must hold a header and at least one record",
        ));
    }
    let body = length - HEADER_SIZE;
    if body % RECORD_SIZE != 0 {
        return Err(HwnError::invalid_buffer_size(
            length,
            "frame body is not a whole number of records",
        ));
    }
    Ok(body / RECORD_SIZE)
}

/// Byte length of a frame carrying `count` records.
pub fn frame_size(count: usize) -> Option<usize> {
    count.checked_mul(RECORD_SIZE)?.checked_add(HEADER_SIZE)
}

/// Byte range of record `index` inside a frame.
pub fn record_range(index: usize) -> Option<std::ops::Range<usize>> {
    let start = index.checked_mul(RECORD_SIZE)?.checked_add(HEADER_SIZE)?;
    Some(start..start.checked_add(RECORD_SIZE)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub payload_size: u32,
    pub payload_version: u32,
    pub record_count: u32,
}

impl PayloadHeader {
    /// Header describing a frame of `count` records.
    pub fn for_records(count: usize) -> HwnResult<Self> {
        let size = frame_size(count)
            .ok_or_else(|| HwnError::invalid_parameter("frame size overflows"))?;
        Ok(Self {
            payload_size: count_to_u32(size)?,
            payload_version: PAYLOAD_VERSION,
            record_count: count_to_u32(count)?,
        })
    }

    pub fn decode(bytes: &[u8]) -> HwnResult<Self> {
        let field = |offset| {
            read_u32(bytes, offset)
                .ok_or_else(|| HwnError::invalid_buffer_size(bytes.len(), "truncated header"))
        };
        Ok(Self {
            payload_size: field(0)?,
            payload_version: field(4)?,
            record_count: field(8)?,
        })
    }

    pub fn encode_into(&self, out: &mut [u8]) -> HwnResult<()> {
        let len = out.len();
        let dest = out
            .get_mut(..HEADER_SIZE)
            .ok_or_else(|| HwnError::invalid_buffer_size(len, "no room for header"))?;
        write_u32s(
            dest,
            [self.payload_size, self.payload_version, self.record_count],
        );
        Ok(())
    }
}

/// Decode one record from the first [`RECORD_SIZE`] bytes of `bytes`.
pub fn decode_record(bytes: &[u8]) -> HwnResult<DeviceSettingRecord> {
    let truncated = || HwnError::invalid_buffer_size(bytes.len(), "truncated record");
    let id = read_u32(bytes, 0).ok_or_else(truncated)?;
    let device_type = read_u32(bytes, 4).ok_or_else(truncated)?;
    let mode = read_u32(bytes, 8).ok_or_else(truncated)?;

    let mut settings = [0u32; SETTINGS_COUNT];
    for (index, slot) in settings.iter_mut().enumerate() {
        *slot = read_u32(bytes, 12 + index * 4).ok_or_else(truncated)?;
    }

    Ok(DeviceSettingRecord {
        id,
        device_type: DeviceType::from_raw(device_type),
        mode: DeviceMode::from_raw(mode),
        settings,
    })
}

/// Encode `record` into the first [`RECORD_SIZE`] bytes of `out`.
pub fn encode_record(record: &DeviceSettingRecord, out: &mut [u8]) -> HwnResult<()> {
    let len = out.len();
    let dest = out
        .get_mut(..RECORD_SIZE)
        .ok_or_else(|| HwnError::invalid_buffer_size(len, "no room for record"))?;
    let fixed = [record.id, record.device_type.raw(), record.mode.raw()];
    write_u32s(dest, fixed.into_iter().chain(record.settings));
    Ok(())
}

/// Build a complete frame from `records`.
pub fn encode_frame(records: &[DeviceSettingRecord]) -> HwnResult<Vec<u8>> {
    let header = PayloadHeader::for_records(records.len())?;
    let size = usize::try_from(header.payload_size)
        .map_err(|_| HwnError::invalid_parameter("frame size exceeds usize"))?;
    let mut frame = vec![0u8; size];
    header.encode_into(&mut frame)?;
    for (record, chunk) in records
        .iter()
        .zip(frame.get_mut(HEADER_SIZE..).unwrap_or_default().chunks_exact_mut(RECORD_SIZE))
    {
        encode_record(record, chunk)?;
    }
    Ok(frame)
}

/// Decode every record of a validated frame.
pub fn decode_frame(frame: &[u8]) -> HwnResult<Vec<DeviceSettingRecord>> {
    validate_frame(frame.len())?;
    frame
        .get(HEADER_SIZE..)
        .unwrap_or_default()
        .chunks_exact(RECORD_SIZE)
        .map(decode_record)
        .collect()
}

/// Answer to the HwN device-information query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInformation {
    pub version: u32,
    pub size: u32,
    pub total_devices: u32,
}

impl DeviceInformation {
    pub fn new(total_devices: u32) -> Self {
        Self {
            version: DEVICE_INFORMATION_VERSION,
            size: DEVICE_INFORMATION_SIZE,
            total_devices,
        }
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        write_u32s(&mut out, [self.version, self.size, self.total_devices]);
        out
    }
}
