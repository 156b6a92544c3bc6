//! Path-mapping capability consumed by the decoder.
//!
//! The Security log reports application paths in NT device form
//! (`\Device\HarddiskVolume2\...`). The decoder maps them to display form on
//! a best-effort basis: mapping failures are ignored and the raw value is
//! kept. The Windows implementation lives in `platform::path_mapper`.

use crate::util::error::Result;

/// Requested output form for a mapped path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFormat {
    /// Drive-letter form, e.g. `C:\Windows\System32\svchost.exe`.
    Win32,
    /// NT device form, unchanged.
    NativeNt,
}

/// Maps a raw device path to a display path.
pub trait PathMapper: Send + Sync {
    /// Map `raw` into the requested format. Implementations may fail; callers
    /// on the decode path ignore the failure and keep `raw`.
    fn map_path(&self, raw: &str, format: PathFormat) -> Result<String>;
}

/// Passthrough mapper: returns the raw path unchanged. Used by tests and by
/// embedders that do their own path handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPathMapper;

impl PathMapper for IdentityPathMapper {
    fn map_path(&self, raw: &str, _format: PathFormat) -> Result<String> {
        Ok(raw.to_string())
    }
}
