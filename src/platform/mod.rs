//! Windows implementations of the capabilities the core consumes: the
//! security privilege scope, the audit-policy setter, the live Security-log
//! subscription, and the NT-device path mapper.

pub mod audit_policy;
pub mod event_log;
pub mod path_mapper;
pub mod privilege;

/// Convert a `&str` to a null-terminated UTF-16 vector.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
