//! Canonical data structure for a decoded firewall log entry.
//!
//! Every raw Security-log record the subscription delivers is decoded into
//! this struct. It is immutable once produced and handed to subscribers by
//! value; the watcher keeps no history.

use chrono::{DateTime, Utc};

use crate::util::constants::UNSPECIFIED_ADDRESS;

/// The normalized firewall condition a log entry represents.
///
/// Variants map 1:1 onto the Filtering Platform event IDs the watcher
/// subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EventKind {
    /// 5152 — the Filtering Platform blocked a packet.
    PacketBlocked,
    /// 5154 — an application was permitted to listen on a port.
    ListenPermitted,
    /// 5155 — an application was blocked from listening on a port.
    ListenBlocked,
    /// 5156 — the Filtering Platform permitted a connection.
    ConnectionPermitted,
    /// 5157 — the Filtering Platform blocked a connection.
    ConnectionBlocked,
    /// 5158 — a bind to a local port was permitted.
    BindPermitted,
    /// 5159 — a bind to a local port was blocked.
    BindBlocked,
}

impl EventKind {
    /// Map a numeric Security-log event ID onto its kind.
    ///
    /// Returns `None` for IDs outside the monitored set.
    pub fn from_event_id(id: u32) -> Option<Self> {
        match id {
            5152 => Some(Self::PacketBlocked),
            5154 => Some(Self::ListenPermitted),
            5155 => Some(Self::ListenBlocked),
            5156 => Some(Self::ConnectionPermitted),
            5157 => Some(Self::ConnectionBlocked),
            5158 => Some(Self::BindPermitted),
            5159 => Some(Self::BindBlocked),
            _ => None,
        }
    }

    /// The numeric event ID this kind was decoded from.
    pub fn event_id(&self) -> u32 {
        match self {
            Self::PacketBlocked => 5152,
            Self::ListenPermitted => 5154,
            Self::ListenBlocked => 5155,
            Self::ConnectionPermitted => 5156,
            Self::ConnectionBlocked => 5157,
            Self::BindPermitted => 5158,
            Self::BindBlocked => 5159,
        }
    }
}

/// Traffic direction, decoded from the localized direction token carried by
/// the connection-class events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Direction {
    /// Token `%%14592`.
    Inbound,
    /// Token `%%14593`.
    Outbound,
    /// Any other token, or an event kind that carries no direction field.
    Invalid,
}

/// IP protocol, decoded from the 32-bit IANA protocol number in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Protocol {
    Icmp,
    Igmp,
    Tcp,
    Udp,
    Gre,
    Esp,
    Ah,
    IcmpV6,
    /// Any protocol number without a dedicated variant.
    Other(u32),
}

impl Protocol {
    /// Decode an IANA protocol number.
    pub fn from_number(n: u32) -> Self {
        match n {
            1 => Self::Icmp,
            2 => Self::Igmp,
            6 => Self::Tcp,
            17 => Self::Udp,
            47 => Self::Gre,
            50 => Self::Esp,
            51 => Self::Ah,
            58 => Self::IcmpV6,
            other => Self::Other(other),
        }
    }

    /// Display name for console output.
    pub fn name(&self) -> String {
        match self {
            Self::Icmp => "ICMP".into(),
            Self::Igmp => "IGMP".into(),
            Self::Tcp => "TCP".into(),
            Self::Udp => "UDP".into(),
            Self::Gre => "GRE".into(),
            Self::Esp => "ESP".into(),
            Self::Ah => "AH".into(),
            Self::IcmpV6 => "ICMPv6".into(),
            Self::Other(n) => format!("Proto({n})"),
        }
    }
}

/// A single decoded firewall log entry.
///
/// Invariants: `local_address` and `remote_address` are never empty (empty
/// source fields are normalized to `"::"`); `direction` is `Invalid` for
/// event kinds whose schema carries no direction field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LogEntry {
    /// Capture-time wall clock, not the event's own timestamp.
    pub timestamp: DateTime<Utc>,

    /// Which of the seven monitored conditions this entry represents.
    pub event_kind: EventKind,

    /// Process ID from the record. May be 0 when the OS emitted a sentinel.
    pub process_id: u64,

    /// Display path of the application, mapped from the raw device path on a
    /// best-effort basis.
    pub app_path: String,

    /// Textual local IP address; `"::"` when the source field was empty.
    pub local_address: String,

    /// Local port number.
    pub local_port: u16,

    /// Textual remote IP address; `"::"` for local-only event kinds or when
    /// the source field was empty.
    pub remote_address: String,

    /// Remote port number; 0 for local-only event kinds.
    pub remote_port: u16,

    /// IP protocol of the packet or connection.
    pub protocol: Protocol,

    /// Traffic direction, when the originating schema supports one.
    pub direction: Direction,
}

impl LogEntry {
    /// True when the entry describes a local-side allow/deny action with no
    /// remote endpoint (listen/bind events).
    pub fn is_local_only(&self) -> bool {
        self.remote_port == 0 && self.remote_address == UNSPECIFIED_ADDRESS
    }
}
