//! Shared fixtures for the integration tests: recording fakes for the OS
//! capabilities and builders for well-formed raw records.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use wfplog::core::raw_record::{PropertyValue, RawEventRecord};
use wfplog::core::subscription::{AuditPolicy, AuditSubcategory, EventSource, RecordHandler};
use wfplog::util::error::{Result, WfpLogError};

/// Records every `set_auditing` call it receives.
pub struct RecordingPolicy {
    pub calls: Mutex<Vec<(AuditSubcategory, bool, bool)>>,
    pub fail: bool,
}

impl RecordingPolicy {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn calls(&self) -> Vec<(AuditSubcategory, bool, bool)> {
        self.calls.lock().unwrap().clone()
    }

    /// Disable calls seen so far, in order.
    pub fn disables(&self) -> Vec<AuditSubcategory> {
        self.calls()
            .into_iter()
            .filter(|&(_, s, f)| !s && !f)
            .map(|(sub, _, _)| sub)
            .collect()
    }
}

impl AuditPolicy for RecordingPolicy {
    fn set_auditing(
        &self,
        subcategory: AuditSubcategory,
        success: bool,
        failure: bool,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((subcategory, success, failure));
        if self.fail {
            Err(WfpLogError::AuditPolicy {
                code: 1314, // ERROR_PRIVILEGE_NOT_HELD
                context: "test".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Event source that exposes the registered handler so tests can deliver
/// records as if the OS did.
#[derive(Default)]
pub struct ScriptedSource {
    pub handler: Arc<Mutex<Option<RecordHandler>>>,
}

impl ScriptedSource {
    pub fn new() -> (Self, Arc<Mutex<Option<RecordHandler>>>) {
        let source = Self::default();
        let slot = source.handler.clone();
        (source, slot)
    }
}

impl EventSource for ScriptedSource {
    fn arm(&mut self, handler: RecordHandler) -> Result<()> {
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }

    fn disarm(&mut self) {
        *self.handler.lock().unwrap() = None;
    }
}

/// Deliver a record through the handler a `ScriptedSource` registered.
pub fn deliver(slot: &Arc<Mutex<Option<RecordHandler>>>, record: RawEventRecord) {
    let handler = slot
        .lock()
        .unwrap()
        .clone()
        .expect("source must be armed before delivering");
    handler(record);
}

pub fn text(s: &str) -> PropertyValue {
    PropertyValue::Text(s.into())
}

/// Well-formed record for the directional schema class (5152/5156/5157).
pub fn directional_record(event_id: u32, direction_token: &str) -> RawEventRecord {
    RawEventRecord::new(
        event_id,
        vec![
            PropertyValue::UInt64(4532),
            text(r"\device\harddiskvolume2\windows\system32\svchost.exe"),
            text(direction_token),
            text("192.168.1.10"),
            text("52341"),
            text("93.184.216.34"),
            text("443"),
            PropertyValue::UInt32(6),
        ],
    )
}

/// Well-formed record for the local-only schema class (5154/5155/5158/5159).
pub fn local_only_record(event_id: u32) -> RawEventRecord {
    RawEventRecord::new(
        event_id,
        vec![
            PropertyValue::UInt64(812),
            text(r"\device\harddiskvolume2\windows\system32\services.exe"),
            text("0.0.0.0"),
            text("135"),
            PropertyValue::UInt32(17),
        ],
    )
}
