//! System audit-policy control for the two Filtering Platform subcategories.
//!
//! Submits an `AUDIT_POLICY_INFORMATION` record via `AuditSetSystemPolicy`
//! inside the security privilege scope. The call fully overwrites the
//! success/failure bits of the targeted subcategory and touches nothing
//! else; this component owns exactly the two subcategories it toggles.

use windows::core::GUID;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::Security::Authentication::Identity::{
    AuditSetSystemPolicy, AUDIT_POLICY_INFORMATION,
};

use crate::core::subscription::{AuditPolicy, AuditSubcategory};
use crate::platform::privilege::with_security_privilege;
use crate::util::error::{Result, WfpLogError};

const POLICY_AUDIT_EVENT_SUCCESS: u32 = 0x1;
const POLICY_AUDIT_EVENT_FAILURE: u32 = 0x2;

/// "Filtering Platform Packet Drop" — {0CCE9225-69AE-11D9-BED3-505054503030}.
const PACKET_DROP_SUBCATEGORY: GUID = GUID::from_u128(0x0CCE9225_69AE_11D9_BED3_505054503030);

/// "Filtering Platform Connection" — {0CCE9226-69AE-11D9-BED3-505054503030}.
const CONNECTION_SUBCATEGORY: GUID = GUID::from_u128(0x0CCE9226_69AE_11D9_BED3_505054503030);

/// [`AuditPolicy`] backed by the live system audit policy.
pub struct SystemAuditPolicy;

impl AuditPolicy for SystemAuditPolicy {
    fn set_auditing(
        &self,
        subcategory: AuditSubcategory,
        success: bool,
        failure: bool,
    ) -> Result<()> {
        let guid = match subcategory {
            AuditSubcategory::PacketDrop => PACKET_DROP_SUBCATEGORY,
            AuditSubcategory::ConnectionLogging => CONNECTION_SUBCATEGORY,
        };
        with_security_privilege(|| submit_policy(guid, success, failure, subcategory))?
    }
}

fn submit_policy(
    guid: GUID,
    success: bool,
    failure: bool,
    subcategory: AuditSubcategory,
) -> Result<()> {
    let mut auditing = 0u32;
    if success {
        auditing |= POLICY_AUDIT_EVENT_SUCCESS;
    }
    if failure {
        auditing |= POLICY_AUDIT_EVENT_FAILURE;
    }
    // The policy model requires category and subcategory set to the same
    // identifier for a single-subcategory update.
    let info = AUDIT_POLICY_INFORMATION {
        AuditSubCategoryGuid: guid,
        AuditingInformation: auditing,
        AuditCategoryGuid: guid,
    };

    // SAFETY: `info` is a fully initialised single-element policy record.
    let ok = unsafe { AuditSetSystemPolicy(&[info]) };
    if ok.as_bool() {
        tracing::debug!(
            "Audit policy for {:?} set to success={} failure={}",
            subcategory,
            success,
            failure
        );
        Ok(())
    } else {
        // SAFETY: immediate last-error read after the failed call.
        let code = unsafe { GetLastError() }.0;
        Err(WfpLogError::AuditPolicy {
            code,
            context: format!("AuditSetSystemPolicy for {subcategory:?}"),
        })
    }
}
