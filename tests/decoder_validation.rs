//! Validates the decoder across the full monitored event-ID set: kind
//! mapping, schema-class field placement, direction tokens, and address
//! normalization.

mod common;

use common::{directional_record, local_only_record, text};
use wfplog::core::decoder::decode;
use wfplog::core::path_map::IdentityPathMapper;
use wfplog::core::raw_record::{PropertyValue, RawEventRecord};
use wfplog::util::constants::MONITORED_EVENT_IDS;
use wfplog::{Direction, EventKind, Protocol, WfpLogError};

const LOCAL_ONLY_IDS: [u32; 4] = [5154, 5155, 5158, 5159];
const DIRECTIONAL_IDS: [u32; 3] = [5152, 5156, 5157];

fn record_for(event_id: u32) -> RawEventRecord {
    if LOCAL_ONLY_IDS.contains(&event_id) {
        local_only_record(event_id)
    } else {
        directional_record(event_id, "%%14592")
    }
}

#[test]
fn every_monitored_id_decodes_to_its_kind() {
    for id in MONITORED_EVENT_IDS {
        let entry = decode(&record_for(id), &IdentityPathMapper)
            .unwrap_or_else(|e| panic!("event {id} failed to decode: {e}"));
        assert_eq!(entry.event_kind.event_id(), id);
    }
}

#[test]
fn local_only_class_always_has_empty_remote_side() {
    for id in LOCAL_ONLY_IDS {
        let entry = decode(&local_only_record(id), &IdentityPathMapper).unwrap();
        assert_eq!(entry.remote_address, "::", "event {id}");
        assert_eq!(entry.remote_port, 0, "event {id}");
        assert_eq!(entry.direction, Direction::Invalid, "event {id}");
        assert_eq!(entry.local_address, "0.0.0.0");
        assert_eq!(entry.local_port, 135);
        assert_eq!(entry.protocol, Protocol::Udp);
    }
}

#[test]
fn directional_class_reads_shifted_offsets() {
    for id in DIRECTIONAL_IDS {
        let entry = decode(&directional_record(id, "%%14593"), &IdentityPathMapper).unwrap();
        assert_eq!(entry.process_id, 4532, "event {id}");
        assert_eq!(entry.local_address, "192.168.1.10");
        assert_eq!(entry.local_port, 52341);
        assert_eq!(entry.remote_address, "93.184.216.34");
        assert_eq!(entry.remote_port, 443);
        assert_eq!(entry.protocol, Protocol::Tcp);
        assert_eq!(entry.direction, Direction::Outbound);
    }
}

#[test]
fn direction_tokens_map_exactly() {
    let cases = [
        ("%%14592", Direction::Inbound),
        ("%%14593", Direction::Outbound),
        ("%%14594", Direction::Invalid),
        ("", Direction::Invalid),
        ("inbound", Direction::Invalid),
    ];
    for (token, expected) in cases {
        let entry = decode(&directional_record(5156, token), &IdentityPathMapper).unwrap();
        assert_eq!(entry.direction, expected, "token {token:?}");
    }
}

#[test]
fn empty_addresses_normalize_and_nonempty_pass_through() {
    let mut record = directional_record(5152, "%%14592");
    record.properties[3] = text("");
    record.properties[5] = PropertyValue::Null;
    let entry = decode(&record, &IdentityPathMapper).unwrap();
    assert_eq!(entry.local_address, "::");
    assert_eq!(entry.remote_address, "::");

    let entry = decode(&directional_record(5152, "%%14592"), &IdentityPathMapper).unwrap();
    assert_eq!(entry.local_address, "192.168.1.10");
    assert_eq!(entry.remote_address, "93.184.216.34");
}

#[test]
fn produced_entries_never_carry_empty_addresses() {
    for id in MONITORED_EVENT_IDS {
        let mut record = record_for(id);
        // Blank out every property that feeds an address field.
        for prop in record.properties.iter_mut() {
            if matches!(prop, PropertyValue::Text(s) if s.contains('.')) {
                *prop = PropertyValue::Null;
            }
        }
        let entry = decode(&record, &IdentityPathMapper).unwrap();
        assert!(!entry.local_address.is_empty(), "event {id}");
        assert!(!entry.remote_address.is_empty(), "event {id}");
    }
}

#[test]
fn event_kind_mapping_is_one_to_one() {
    let kinds = [
        (5152, EventKind::PacketBlocked),
        (5154, EventKind::ListenPermitted),
        (5155, EventKind::ListenBlocked),
        (5156, EventKind::ConnectionPermitted),
        (5157, EventKind::ConnectionBlocked),
        (5158, EventKind::BindPermitted),
        (5159, EventKind::BindBlocked),
    ];
    for (id, kind) in kinds {
        let entry = decode(&record_for(id), &IdentityPathMapper).unwrap();
        assert_eq!(entry.event_kind, kind);
    }
}

#[test]
fn malformed_local_port_is_a_hard_fault_in_both_classes() {
    let mut record = local_only_record(5159);
    record.properties[3] = text("13x5");
    assert!(matches!(
        decode(&record, &IdentityPathMapper),
        Err(WfpLogError::MalformedPort { .. })
    ));

    let mut record = directional_record(5157, "%%14592");
    record.properties[4] = text("");
    assert!(matches!(
        decode(&record, &IdentityPathMapper),
        Err(WfpLogError::MalformedPort { .. })
    ));
}
