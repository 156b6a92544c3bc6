//! NT device path to drive-letter path mapping.
//!
//! The Security log reports application paths like
//! `\Device\HarddiskVolume2\Windows\System32\svchost.exe`. This mapper
//! resolves the device prefix to a drive letter using the DOS device table,
//! built once at construction. Paths with no known prefix fail to map; the
//! decoder then keeps the raw value.

use windows::core::PCWSTR;
use windows::Win32::Storage::FileSystem::{GetLogicalDrives, QueryDosDeviceW};

use crate::core::path_map::{PathFormat, PathMapper};
use crate::platform::to_wide;
use crate::util::constants::DOS_DEVICE_BUFFER_SIZE;
use crate::util::error::{Result, WfpLogError};

/// [`PathMapper`] backed by the DOS device table of the local machine.
pub struct DevicePathMapper {
    /// `(lowercased device prefix, drive)` pairs, longest prefix first so
    /// `HarddiskVolume12` wins over `HarddiskVolume1`.
    table: Vec<(String, String)>,
}

impl DevicePathMapper {
    pub fn new() -> Self {
        Self {
            table: build_device_table(),
        }
    }
}

impl Default for DevicePathMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMapper for DevicePathMapper {
    fn map_path(&self, raw: &str, format: PathFormat) -> Result<String> {
        if format == PathFormat::NativeNt {
            return Ok(raw.to_string());
        }
        map_with_table(&self.table, raw)
    }
}

/// Longest-prefix match of `raw` against the device table.
fn map_with_table(table: &[(String, String)], raw: &str) -> Result<String> {
    let lower = raw.to_ascii_lowercase();
    for (device, drive) in table {
        if lower.starts_with(device.as_str()) {
            let rest = &raw[device.len()..];
            // Prefix must end on a path component boundary.
            if rest.is_empty() || rest.starts_with('\\') {
                return Ok(format!("{drive}{rest}"));
            }
        }
    }
    Err(WfpLogError::PathMap(format!(
        "No drive mapping for {raw:?}"
    )))
}

/// Query the DOS device target for every present drive letter.
fn build_device_table() -> Vec<(String, String)> {
    let mut table = Vec::new();

    // SAFETY: no arguments; returns a bitmask of present drive letters.
    let drives = unsafe { GetLogicalDrives() };

    for i in 0..26u32 {
        if drives & (1 << i) == 0 {
            continue;
        }
        let drive = format!("{}:", (b'A' + i as u8) as char);
        let drive_wide = to_wide(&drive);
        let mut buffer = vec![0u16; DOS_DEVICE_BUFFER_SIZE];

        // SAFETY: drive_wide is null-terminated; buffer receives a MULTI_SZ
        // list whose first string is the device target.
        let len = unsafe { QueryDosDeviceW(PCWSTR(drive_wide.as_ptr()), Some(&mut buffer)) };
        if len == 0 {
            tracing::trace!("QueryDosDeviceW failed for {}", drive);
            continue;
        }

        let first_len = buffer.iter().position(|&c| c == 0).unwrap_or(0);
        if first_len == 0 {
            continue;
        }
        let device = String::from_utf16_lossy(&buffer[..first_len]).to_ascii_lowercase();
        table.push((device, drive));
    }

    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    tracing::debug!("Built device table with {} entries", table.len());
    table
}
