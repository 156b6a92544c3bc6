//! Crate-wide constants for wfplog.
//!
//! Centralising magic numbers here keeps the rest of the codebase clean and
//! makes the event/schema tables auditable in one place.

/// The event log channel carrying Windows Filtering Platform audit events.
pub const SECURITY_CHANNEL: &str = "Security";

/// The seven Filtering Platform event IDs the watcher subscribes to.
///
/// - 5152: packet blocked
/// - 5154: listen permitted
/// - 5155: listen blocked
/// - 5156: connection permitted
/// - 5157: connection blocked
/// - 5158: bind permitted
/// - 5159: bind blocked
pub const MONITORED_EVENT_IDS: [u32; 7] = [5152, 5154, 5155, 5156, 5157, 5158, 5159];

/// Localized direction token the Security log uses for inbound traffic.
pub const DIRECTION_INBOUND_TOKEN: &str = "%%14592";

/// Localized direction token the Security log uses for outbound traffic.
pub const DIRECTION_OUTBOUND_TOKEN: &str = "%%14593";

/// The IPv6 unspecified-address literal substituted for empty address fields.
/// Every produced log entry carries non-empty address strings.
pub const UNSPECIFIED_ADDRESS: &str = "::";

/// Audit subcategory GUID string for "Filtering Platform Packet Drop".
pub const PACKET_DROP_SUBCATEGORY_GUID: &str = "0CCE9225-69AE-11D9-BED3-505054503030";

/// Audit subcategory GUID string for "Filtering Platform Connection".
pub const CONNECTION_SUBCATEGORY_GUID: &str = "0CCE9226-69AE-11D9-BED3-505054503030";

/// Buffer size (in `u16` units) for `EvtRender` output.
/// 8 KB (16 KB raw) is enough for the vast majority of events; the buffer
/// grows on demand for larger events.
pub const EVT_RENDER_BUFFER_SIZE: usize = 8_192;

/// Buffer size (in `u16` units) for `QueryDosDeviceW` output.
pub const DOS_DEVICE_BUFFER_SIZE: usize = 1_024;

/// Application display name used in log banners.
pub const APP_NAME: &str = "wfplog";

/// Application version string.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the XPath predicate selecting exactly the monitored event IDs,
/// e.g. `*[System[(EventID=5152 or EventID=5154 or ...)]]`.
pub fn monitored_events_query() -> String {
    let clauses: Vec<String> = MONITORED_EVENT_IDS
        .iter()
        .map(|id| format!("EventID={id}"))
        .collect();
    format!("*[System[({})]]", clauses.join(" or "))
}
