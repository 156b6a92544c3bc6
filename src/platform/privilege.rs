//! Temporarily held `SeSecurityPrivilege` for audit-policy changes.
//!
//! Changing the system audit policy requires `SeSecurityPrivilege` to be
//! enabled on the process token. [`with_security_privilege`] enables it,
//! runs the callback, and restores the previous token state on every exit
//! path, including a panicking callback. The elevated window is scoped to
//! the policy call only, never held across record processing.

use windows::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_NOT_ALL_ASSIGNED, HANDLE, LUID,
};
use windows::Win32::Security::{
    AdjustTokenPrivileges, LookupPrivilegeValueW, LUID_AND_ATTRIBUTES, SE_PRIVILEGE_ENABLED,
    SE_SECURITY_NAME, TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES, TOKEN_QUERY,
};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

use crate::util::error::{Result, WfpLogError};

/// Owns the process token handle for the duration of the privilege window.
struct TokenHandle(HANDLE);

impl Drop for TokenHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from OpenProcessToken and is closed once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Restores the token's previous privilege state when dropped.
struct RestoreGuard<'a> {
    token: &'a TokenHandle,
    previous: TOKEN_PRIVILEGES,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: token is still open (RestoreGuard borrows it) and
        // `previous` is the state captured by the enabling call.
        unsafe {
            let _ = AdjustTokenPrivileges(
                self.token.0,
                false,
                Some(&self.previous as *const TOKEN_PRIVILEGES),
                std::mem::size_of::<TOKEN_PRIVILEGES>() as u32,
                None,
                None,
            );
        }
    }
}

/// Run `f` with `SeSecurityPrivilege` enabled on the current process token.
///
/// Fails if the token cannot be opened or the privilege is not held by the
/// process (e.g. a restricted service context).
pub fn with_security_privilege<T>(f: impl FnOnce() -> T) -> Result<T> {
    let mut raw_token = HANDLE::default();
    // SAFETY: GetCurrentProcess returns a pseudo-handle that needs no close;
    // raw_token receives a real handle owned by TokenHandle below.
    unsafe {
        OpenProcessToken(
            GetCurrentProcess(),
            TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
            &mut raw_token,
        )
    }
    .map_err(|e| WfpLogError::WindowsApi {
        hr: e.code().0 as u32,
        context: "OpenProcessToken".into(),
    })?;
    let token = TokenHandle(raw_token);

    let mut luid = LUID::default();
    // SAFETY: SE_SECURITY_NAME is a static null-terminated UTF-16 string.
    unsafe { LookupPrivilegeValueW(None, SE_SECURITY_NAME, &mut luid) }.map_err(|e| {
        WfpLogError::WindowsApi {
            hr: e.code().0 as u32,
            context: "LookupPrivilegeValueW(SeSecurityPrivilege)".into(),
        }
    })?;

    let new_state = TOKEN_PRIVILEGES {
        PrivilegeCount: 1,
        Privileges: [LUID_AND_ATTRIBUTES {
            Luid: luid,
            Attributes: SE_PRIVILEGE_ENABLED,
        }],
    };
    let mut previous = TOKEN_PRIVILEGES::default();
    let mut previous_len = std::mem::size_of::<TOKEN_PRIVILEGES>() as u32;

    // SAFETY: token is open with TOKEN_ADJUST_PRIVILEGES; `previous` receives
    // the prior state for the single adjusted privilege.
    unsafe {
        AdjustTokenPrivileges(
            token.0,
            false,
            Some(&new_state as *const TOKEN_PRIVILEGES),
            previous_len,
            Some(&mut previous as *mut TOKEN_PRIVILEGES),
            Some(&mut previous_len as *mut u32),
        )
    }
    .map_err(|e| WfpLogError::WindowsApi {
        hr: e.code().0 as u32,
        context: "AdjustTokenPrivileges(enable SeSecurityPrivilege)".into(),
    })?;

    // AdjustTokenPrivileges succeeds even when the privilege is absent from
    // the token; the real outcome is in the last-error value.
    // SAFETY: immediate last-error read after the call above.
    if unsafe { GetLastError() } == ERROR_NOT_ALL_ASSIGNED {
        return Err(WfpLogError::AuditPolicy {
            code: ERROR_NOT_ALL_ASSIGNED.0,
            context: "SeSecurityPrivilege not held by this process".into(),
        });
    }

    let _restore = RestoreGuard {
        token: &token,
        previous,
    };
    Ok(f())
}
