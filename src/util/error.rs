//! Unified error types for wfplog.
//!
//! All fallible operations throughout the codebase return `Result<T, WfpLogError>`.
//! This ensures consistent error reporting and clean propagation via the `?` operator.
//!
//! The handling policy is deliberately uneven across variants: audit-policy and
//! path-mapping failures are logged and discarded at their call sites (the
//! watcher degrades rather than aborts), decode failures drop the single
//! offending record, and only subscription faults surface to the embedding
//! application.

/// Unified error type used throughout wfplog.
///
/// Each variant captures enough context to produce an actionable message for
/// log output.
#[derive(Debug, thiserror::Error)]
pub enum WfpLogError {
    /// A Windows API call failed. `hr` is the raw HRESULT code and `context`
    /// describes which operation triggered the failure.
    #[error("Windows API error: {context} (HRESULT: 0x{hr:08X})")]
    WindowsApi {
        /// The raw HRESULT error code from the Windows API.
        hr: u32,
        /// Human-readable description of the operation that failed.
        context: String,
    },

    /// The audit-policy set call was rejected (missing privilege, platform
    /// refusal). Swallowed at the enable/disable boundary.
    #[error("Audit policy change failed: {context} (status: {code})")]
    AuditPolicy {
        /// Raw Win32 error code from `AuditSetSystemPolicy` / privilege setup.
        code: u32,
        /// Which subcategory/state transition was being applied.
        context: String,
    },

    /// Path mapping failed. The caller uses the raw path instead.
    #[error("Path mapping failed: {0}")]
    PathMap(String),

    /// A port field of an event record could not be parsed as a base-10
    /// integer. A malformed port indicates a schema mismatch, so decoding
    /// the record is aborted rather than silently zeroing the field.
    #[error("Event {event_id}: malformed port text {value:?} at property {offset}")]
    MalformedPort {
        /// Numeric event ID of the offending record.
        event_id: u32,
        /// Positional property offset the port was read from.
        offset: usize,
        /// The unparseable text value.
        value: String,
    },

    /// A record arrived with an event ID outside the monitored set. The
    /// subscription filter should make this impossible; seeing it means the
    /// filter and the decoder disagree.
    #[error("Unsupported event ID: {0}")]
    UnknownEventId(u32),

    /// XML returned by `EvtRender` could not be parsed into a raw record.
    #[error("Event XML parse error: {0}")]
    XmlParse(String),

    /// The underlying OS event subscription failed. Propagates to the
    /// embedding application, which decides whether to recreate the watcher.
    #[error("Event subscription fault: {context} (HRESULT: 0x{hr:08X})")]
    Subscription {
        /// The raw HRESULT error code from the subscription API.
        hr: u32,
        /// Human-readable description of the operation that failed.
        context: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WfpLogError>;

/// Convert a raw Windows `HRESULT` (or `GetLastError` code) into a
/// [`WfpLogError::WindowsApi`] with the given context string.
#[allow(dead_code)]
pub fn windows_err(hr: u32, context: impl Into<String>) -> WfpLogError {
    WfpLogError::WindowsApi {
        hr,
        context: context.into(),
    }
}
