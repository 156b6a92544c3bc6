//! Security-log subscription with a coupled audit-policy toggle.
//!
//! [`SecurityLogSubscription`] owns the enabled flag that is the single
//! source of truth for the watcher. Enabling turns the OS audit policy on
//! for both Filtering Platform subcategories *before* arming the
//! subscription (no event window is missed); disabling disarms *before*
//! turning the policy off (no dangling subscription receives events after
//! the policy changes). Audit-policy failures are logged and swallowed so a
//! restricted process degrades to "no OS-level detail auditing" instead of
//! aborting.

use std::sync::Arc;

use crate::core::raw_record::RawEventRecord;
use crate::util::error::Result;

/// Per-record callback invoked by the event source on its delivery thread.
pub type RecordHandler = Arc<dyn Fn(RawEventRecord) + Send + Sync>;

/// The two audit subcategories this component owns.
///
/// Each `set_auditing` call fully overwrites the targeted subcategory's
/// success/failure bits; unrelated audit policy is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSubcategory {
    /// "Filtering Platform Packet Drop".
    PacketDrop,
    /// "Filtering Platform Connection".
    ConnectionLogging,
}

impl AuditSubcategory {
    /// GUID string identifying the subcategory (and, per the policy model,
    /// also used as the category identifier).
    pub fn guid_str(&self) -> &'static str {
        match self {
            Self::PacketDrop => crate::util::constants::PACKET_DROP_SUBCATEGORY_GUID,
            Self::ConnectionLogging => crate::util::constants::CONNECTION_SUBCATEGORY_GUID,
        }
    }
}

/// OS audit-policy capability: set success/failure auditing bits for one
/// subcategory. The system implementation runs inside a temporarily held
/// `SeSecurityPrivilege`; see `platform::audit_policy`.
pub trait AuditPolicy: Send + Sync {
    fn set_auditing(&self, subcategory: AuditSubcategory, success: bool, failure: bool)
        -> Result<()>;
}

/// OS event-subscription capability over the Security channel, filtered to
/// the monitored event IDs.
///
/// `arm` registers the handler and starts delivery; `disarm` stops delivery
/// and is the serialization point — after it returns no new callbacks are
/// scheduled, though an in-flight one may still complete. Both are bounded
/// blocking calls made only at enable/disable transitions.
pub trait EventSource: Send {
    fn arm(&mut self, handler: RecordHandler) -> Result<()>;
    fn disarm(&mut self);
}

/// A live, toggleable subscription to the firewall events of the Security
/// log, driving the audit policy alongside its own armed state.
pub struct SecurityLogSubscription {
    source: Box<dyn EventSource>,
    policy: Arc<dyn AuditPolicy>,
    handler: RecordHandler,
    enabled: bool,
}

impl SecurityLogSubscription {
    pub fn new(
        source: Box<dyn EventSource>,
        policy: Arc<dyn AuditPolicy>,
        handler: RecordHandler,
    ) -> Self {
        Self {
            source,
            policy,
            handler,
            enabled: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle the subscription. No-op when set to the current value.
    ///
    /// Only a subscription fault from arming surfaces; audit-policy errors
    /// are swallowed here. If arming fails the policy bits are rolled back
    /// off before the fault propagates.
    pub fn set_enabled(&mut self, value: bool) -> Result<()> {
        if value == self.enabled {
            return Ok(());
        }

        if value {
            self.apply_auditing(true);
            if let Err(e) = self.source.arm(self.handler.clone()) {
                self.apply_auditing(false);
                return Err(e);
            }
            self.enabled = true;
        } else {
            self.source.disarm();
            self.apply_auditing(false);
            self.enabled = false;
        }
        Ok(())
    }

    /// Assert the success+failure auditing bits for both owned subcategories.
    /// Failures are logged and ignored.
    fn apply_auditing(&self, on: bool) {
        for subcategory in [
            AuditSubcategory::PacketDrop,
            AuditSubcategory::ConnectionLogging,
        ] {
            if let Err(e) = self.policy.set_auditing(subcategory, on, on) {
                tracing::warn!(
                    "Could not {} auditing for {:?}: {}",
                    if on { "enable" } else { "disable" },
                    subcategory,
                    e
                );
            }
        }
    }
}

impl Drop for SecurityLogSubscription {
    /// Teardown releases the subscription and explicitly disables auditing,
    /// even if a disable was already pending. The OS audit policy must never
    /// stay on once the process no longer holds a live subscription.
    fn drop(&mut self) {
        self.source.disarm();
        self.apply_auditing(false);
        self.enabled = false;
    }
}
