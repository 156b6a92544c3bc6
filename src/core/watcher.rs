//! Watcher façade: the complete external surface of the crate.
//!
//! Composes the audit-policy-driven subscription, the decoder, and a
//! subscriber fan-out behind an `enabled` toggle. Per-record handling is
//! synchronous on the OS delivery thread: decode, then broadcast. A record
//! that fails to decode is dropped with a debug log and the subscription
//! keeps running; a disconnected subscriber is pruned and never blocks
//! delivery to the others.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::decoder;
use crate::core::log_entry::LogEntry;
use crate::core::path_map::PathMapper;
use crate::core::subscription::{AuditPolicy, EventSource, RecordHandler, SecurityLogSubscription};
use crate::util::error::Result;

type SubscriberList = Arc<Mutex<Vec<Sender<LogEntry>>>>;

/// Watches the Security log for firewall events and fans decoded entries out
/// to subscribers.
pub struct FirewallLogWatcher {
    subscription: SecurityLogSubscription,
    subscribers: SubscriberList,
}

impl FirewallLogWatcher {
    /// Build a watcher from its capabilities. Use [`FirewallLogWatcher::system`]
    /// for the live Windows wiring.
    pub fn new(
        source: Box<dyn EventSource>,
        policy: Arc<dyn AuditPolicy>,
        mapper: Arc<dyn PathMapper>,
    ) -> Self {
        let subscribers: SubscriberList = Arc::new(Mutex::new(Vec::new()));
        let handler = record_handler(mapper, subscribers.clone());
        Self {
            subscription: SecurityLogSubscription::new(source, policy, handler),
            subscribers,
        }
    }

    /// Watcher over the live Security event log, with the system audit
    /// policy and the NT-device path mapper.
    #[cfg(windows)]
    pub fn system() -> Self {
        Self::new(
            Box::new(crate::platform::event_log::SecurityEventSource::new()),
            Arc::new(crate::platform::audit_policy::SystemAuditPolicy),
            Arc::new(crate::platform::path_mapper::DevicePathMapper::new()),
        )
    }

    /// Register a subscriber. Every subscriber receives every entry decoded
    /// after registration, in delivery order.
    pub fn subscribe(&self) -> Receiver<LogEntry> {
        let (tx, rx) = unbounded();
        lock_subscribers(&self.subscribers).push(tx);
        rx
    }

    pub fn enabled(&self) -> bool {
        self.subscription.enabled()
    }

    /// Toggle watching. See [`SecurityLogSubscription::set_enabled`] for the
    /// policy/arming ordering; only subscription faults surface.
    pub fn set_enabled(&mut self, value: bool) -> Result<()> {
        self.subscription.set_enabled(value)
    }
}

/// Build the per-record handler: decode, then broadcast.
fn record_handler(mapper: Arc<dyn PathMapper>, subscribers: SubscriberList) -> RecordHandler {
    Arc::new(move |record| {
        match decoder::decode(&record, mapper.as_ref()) {
            Ok(entry) => {
                let mut subs = lock_subscribers(&subscribers);
                subs.retain(|tx| tx.send(entry.clone()).is_ok());
            }
            Err(e) => {
                // One bad record must never kill the subscription.
                tracing::debug!("Dropping record (event {}): {}", record.event_id, e);
            }
        }
    })
}

/// Lock the subscriber list, recovering from a poisoned mutex. A subscriber
/// panic on another thread must not stop delivery.
fn lock_subscribers(list: &SubscriberList) -> std::sync::MutexGuard<'_, Vec<Sender<LogEntry>>> {
    match list.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_entry::{Direction, EventKind};
    use crate::core::path_map::IdentityPathMapper;
    use crate::core::raw_record::{PropertyValue, RawEventRecord};
    use crate::core::subscription::AuditSubcategory;

    struct NoopPolicy;
    impl AuditPolicy for NoopPolicy {
        fn set_auditing(&self, _: AuditSubcategory, _: bool, _: bool) -> Result<()> {
            Ok(())
        }
    }

    /// Event source that hands the registered handler back to the test so
    /// records can be injected as if the OS delivered them.
    #[derive(Default)]
    struct ScriptedSource {
        handler: Arc<Mutex<Option<RecordHandler>>>,
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

    fn watcher() -> (FirewallLogWatcher, Arc<Mutex<Option<RecordHandler>>>) {
        let source = ScriptedSource::default();
        let handler_slot = source.handler.clone();
        let watcher = FirewallLogWatcher::new(
            Box::new(source),
            Arc::new(NoopPolicy),
            Arc::new(IdentityPathMapper),
        );
        (watcher, handler_slot)
    }

    fn deliver(slot: &Arc<Mutex<Option<RecordHandler>>>, record: RawEventRecord) {
        let handler = slot.lock().unwrap().clone().expect("source must be armed");
        handler(record);
    }

    fn text(s: &str) -> PropertyValue {
        PropertyValue::Text(s.into())
    }

    fn connection_record(remote_port: &str) -> RawEventRecord {
        RawEventRecord::new(
            5157,
            vec![
                PropertyValue::UInt64(100),
                text(r"\device\harddiskvolume2\app.exe"),
                text("%%14592"),
                text("10.0.0.2"),
                text("445"),
                text("10.0.0.9"),
                text(remote_port),
                PropertyValue::UInt32(6),
            ],
        )
    }

    #[test]
    fn test_every_subscriber_sees_every_entry() {
        let (mut watcher, slot) = watcher();
        let rx1 = watcher.subscribe();
        let rx2 = watcher.subscribe();
        watcher.set_enabled(true).unwrap();

        deliver(&slot, connection_record("52000"));

        for rx in [&rx1, &rx2] {
            let entry = rx.try_recv().expect("entry must be delivered");
            assert_eq!(entry.event_kind, EventKind::ConnectionBlocked);
            assert_eq!(entry.direction, Direction::Inbound);
            assert_eq!(entry.remote_port, 52000);
        }
    }

    #[test]
    fn test_bad_record_is_dropped_and_watching_continues() {
        let (mut watcher, slot) = watcher();
        let rx = watcher.subscribe();
        watcher.set_enabled(true).unwrap();

        deliver(&slot, connection_record("not-a-port"));
        assert!(rx.try_recv().is_err(), "malformed record must not emit");

        deliver(&slot, connection_record("52000"));
        let entry = rx.try_recv().expect("well-formed record still delivered");
        assert_eq!(entry.remote_port, 52000);
    }

    #[test]
    fn test_disconnected_subscriber_does_not_block_others() {
        let (mut watcher, slot) = watcher();
        let rx_dead = watcher.subscribe();
        let rx_live = watcher.subscribe();
        watcher.set_enabled(true).unwrap();
        drop(rx_dead);

        deliver(&slot, connection_record("52000"));
        assert!(rx_live.try_recv().is_ok());
    }

    #[test]
    fn test_disposal_disarms_the_source() {
        let (mut watcher, slot) = watcher();
        watcher.set_enabled(true).unwrap();
        assert!(slot.lock().unwrap().is_some());

        drop(watcher);
        assert!(slot.lock().unwrap().is_none());
    }
}
