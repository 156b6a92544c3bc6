//! wfplog library crate.
//!
//! Watches the Windows Security event log for Filtering Platform
//! packet/connection events and decodes them into typed [`LogEntry`] values.
//! The binary entry point is in `main.rs`.

pub mod core;
#[cfg(windows)]
pub mod platform;
pub mod util;

pub use crate::core::log_entry::{Direction, EventKind, LogEntry, Protocol};
pub use crate::core::watcher::FirewallLogWatcher;
pub use crate::util::error::{Result, WfpLogError};
