//! Decoder from raw Security-log records to [`LogEntry`] values.
//!
//! Dispatch is a static table keyed by event ID. Two schema classes exist:
//! the listen/bind events carry only the local endpoint, the packet and
//! connection events additionally carry a direction token and a remote
//! endpoint, at shifted offsets. Keeping the offsets in one table makes
//! adding or auditing event IDs mechanical.

use chrono::Utc;

use crate::core::log_entry::{Direction, EventKind, LogEntry, Protocol};
use crate::core::path_map::{PathFormat, PathMapper};
use crate::core::raw_record::RawEventRecord;
use crate::util::constants::{
    DIRECTION_INBOUND_TOKEN, DIRECTION_OUTBOUND_TOKEN, UNSPECIFIED_ADDRESS,
};
use crate::util::error::{Result, WfpLogError};

/// Positional property offsets for one schema class.
struct FieldLayout {
    process_id: usize,
    app_path: usize,
    /// Offset of the localized direction token; `None` for schemas without
    /// a direction field.
    direction: Option<usize>,
    local_address: usize,
    local_port: usize,
    /// Remote endpoint offsets; `None` for the local-only class.
    remote_address: Option<usize>,
    remote_port: Option<usize>,
    protocol: usize,
}

/// Listen/bind events (5154, 5155, 5158, 5159): local endpoint only.
const LOCAL_ONLY_LAYOUT: FieldLayout = FieldLayout {
    process_id: 0,
    app_path: 1,
    direction: None,
    local_address: 2,
    local_port: 3,
    remote_address: None,
    remote_port: None,
    protocol: 4,
};

/// Packet/connection events (5152, 5156, 5157): direction token at offset 2,
/// remote endpoint present.
const DIRECTIONAL_LAYOUT: FieldLayout = FieldLayout {
    process_id: 0,
    app_path: 1,
    direction: Some(2),
    local_address: 3,
    local_port: 4,
    remote_address: Some(5),
    remote_port: Some(6),
    protocol: 7,
};

fn layout_for(kind: EventKind) -> &'static FieldLayout {
    match kind {
        EventKind::ListenPermitted
        | EventKind::ListenBlocked
        | EventKind::BindPermitted
        | EventKind::BindBlocked => &LOCAL_ONLY_LAYOUT,
        EventKind::PacketBlocked
        | EventKind::ConnectionPermitted
        | EventKind::ConnectionBlocked => &DIRECTIONAL_LAYOUT,
    }
}

/// Decode a raw record into a [`LogEntry`].
///
/// Total over every record the subscription can deliver: unexpected property
/// shapes default (process ID 0, protocol `Other`, direction `Invalid`)
/// rather than fail. The two hard faults are an event ID outside the
/// monitored set and a port field that does not parse base-10 — both mean
/// the record does not match the schema and the caller should drop it.
///
/// The entry's timestamp is capture time, not the record's own timestamp.
pub fn decode(record: &RawEventRecord, mapper: &dyn PathMapper) -> Result<LogEntry> {
    let kind = EventKind::from_event_id(record.event_id)
        .ok_or(WfpLogError::UnknownEventId(record.event_id))?;
    let layout = layout_for(kind);

    let direction = match layout.direction {
        Some(offset) => decode_direction(&record.text_at(offset)),
        None => Direction::Invalid,
    };

    let local_port = record.port_at(layout.local_port)?;
    let (remote_address, remote_port) = match (layout.remote_address, layout.remote_port) {
        (Some(addr), Some(port)) => (record.text_at(addr), record.port_at(port)?),
        _ => (String::new(), 0),
    };

    let raw_path = record.text_at(layout.app_path);
    let app_path = match mapper.map_path(&raw_path, PathFormat::Win32) {
        Ok(mapped) => mapped,
        Err(e) => {
            tracing::trace!("Path mapping failed for {:?}: {}", raw_path, e);
            raw_path
        }
    };

    Ok(LogEntry {
        timestamp: Utc::now(),
        event_kind: kind,
        process_id: record.u64_at(layout.process_id),
        app_path,
        local_address: normalize_address(record.text_at(layout.local_address)),
        local_port,
        remote_address: normalize_address(remote_address),
        remote_port,
        protocol: Protocol::from_number(record.u32_at(layout.protocol)),
        direction,
    })
}

/// Exact-match the localized direction token. Any other token (including an
/// absent one) is `Invalid`.
fn decode_direction(token: &str) -> Direction {
    match token {
        DIRECTION_INBOUND_TOKEN => Direction::Inbound,
        DIRECTION_OUTBOUND_TOKEN => Direction::Outbound,
        _ => Direction::Invalid,
    }
}

/// Replace empty address strings with the IPv6 unspecified-address literal.
fn normalize_address(addr: String) -> String {
    if addr.is_empty() {
        UNSPECIFIED_ADDRESS.to_string()
    } else {
        addr
    }
}
