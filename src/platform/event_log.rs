//! Live subscription to the Security event log via `EvtSubscribe`.
//!
//! Uses the push model of the modern Evt* API: the OS invokes the callback
//! on its own delivery thread for each arriving event matching the XPath
//! filter. Each event is rendered to XML with `EvtRender` and converted to a
//! [`RawEventRecord`] before being handed to the registered handler.

use std::ffi::c_void;

use windows::core::PCWSTR;
use windows::Win32::System::EventLog::{
    EvtClose, EvtRender, EvtRenderEventXml, EvtSubscribe, EvtSubscribeActionDeliver,
    EvtSubscribeToFutureEvents, EVT_HANDLE, EVT_SUBSCRIBE_NOTIFY_ACTION,
};

use crate::core::raw_record::RawEventRecord;
use crate::core::subscription::{EventSource, RecordHandler};
use crate::platform::to_wide;
use crate::util::constants::{monitored_events_query, EVT_RENDER_BUFFER_SIZE, SECURITY_CHANNEL};
use crate::util::error::{Result, WfpLogError};

/// Context handed to the OS callback. Boxed so its address stays stable for
/// the lifetime of the subscription.
struct SubscriptionContext {
    handler: RecordHandler,
}

/// [`EventSource`] over the live Security log, filtered to the monitored
/// firewall event IDs, delivering future events only.
#[derive(Default)]
pub struct SecurityEventSource {
    subscription: Option<EVT_HANDLE>,
    context: Option<Box<SubscriptionContext>>,
}

impl SecurityEventSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSource for SecurityEventSource {
    fn arm(&mut self, handler: RecordHandler) -> Result<()> {
        if self.subscription.is_some() {
            return Ok(());
        }

        let context = Box::new(SubscriptionContext { handler });
        let channel = to_wide(SECURITY_CHANNEL);
        let query = to_wide(&monitored_events_query());

        // SAFETY: channel and query are null-terminated UTF-16 strings; the
        // context pointer stays valid until disarm closes the subscription
        // (EvtClose returns only after in-flight callbacks complete).
        let handle = unsafe {
            EvtSubscribe(
                None,
                None,
                PCWSTR(channel.as_ptr()),
                PCWSTR(query.as_ptr()),
                None,
                Some(&*context as *const SubscriptionContext as *const c_void),
                Some(record_written_callback),
                EvtSubscribeToFutureEvents.0 as u32,
            )
        }
        .map_err(|e| WfpLogError::Subscription {
            hr: e.code().0 as u32,
            context: format!("EvtSubscribe on '{SECURITY_CHANNEL}'"),
        })?;

        self.context = Some(context);
        self.subscription = Some(handle);
        tracing::debug!("Armed Security log subscription");
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.subscription.take() {
            // SAFETY: closing the subscription handle stops delivery; the
            // call blocks until any in-flight callback returns, after which
            // the context can be dropped.
            unsafe {
                let _ = EvtClose(handle);
            }
            tracing::debug!("Disarmed Security log subscription");
        }
        self.context = None;
    }
}

impl Drop for SecurityEventSource {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// OS-invoked callback for each delivered event.
///
/// Runs on the subscription's delivery thread. Render or parse failures skip
/// the single event; the subscription stays live. The event handle is owned
/// by the subscription machinery and must not be closed here.
unsafe extern "system" fn record_written_callback(
    action: EVT_SUBSCRIBE_NOTIFY_ACTION,
    context: *const c_void,
    event: EVT_HANDLE,
) -> u32 {
    if action != EvtSubscribeActionDeliver || context.is_null() {
        return 0;
    }

    let ctx = &*(context as *const SubscriptionContext);
    match render_event_xml(event) {
        Ok(xml) => match RawEventRecord::from_event_xml(&xml) {
            Ok(record) => (ctx.handler)(record),
            Err(e) => tracing::trace!("Skipping unparseable record: {}", e),
        },
        Err(e) => tracing::trace!("Failed to render event XML: {}", e),
    }
    0
}

/// Render a single event handle to an XML string via `EvtRender`.
fn render_event_xml(event_handle: EVT_HANDLE) -> Result<String> {
    let mut buffer: Vec<u16> = vec![0; EVT_RENDER_BUFFER_SIZE];
    let mut buffer_used = 0u32;
    let mut property_count = 0u32;

    // SAFETY: event_handle is valid for the duration of the callback, buffer
    // is properly sized. EvtRenderEventXml renders the event as a
    // null-terminated UTF-16 string.
    let result = unsafe {
        EvtRender(
            None,
            event_handle,
            EvtRenderEventXml.0 as u32,
            (buffer.len() * 2) as u32,
            Some(buffer.as_mut_ptr() as *mut _),
            &mut buffer_used,
            &mut property_count,
        )
    };

    if let Err(e) = result {
        let code = e.code().0 as u32;
        // ERROR_INSUFFICIENT_BUFFER (122) — grow and retry
        if code == 122 || code == 0x8007_007A {
            let needed = (buffer_used as usize / 2) + 1;
            buffer.resize(needed, 0);
            // SAFETY: retrying with larger buffer
            unsafe {
                EvtRender(
                    None,
                    event_handle,
                    EvtRenderEventXml.0 as u32,
                    (buffer.len() * 2) as u32,
                    Some(buffer.as_mut_ptr() as *mut _),
                    &mut buffer_used,
                    &mut property_count,
                )
            }
            .map_err(|e| WfpLogError::WindowsApi {
                hr: e.code().0 as u32,
                context: "EvtRender retry".into(),
            })?;
        } else {
            return Err(WfpLogError::WindowsApi {
                hr: code,
                context: "EvtRender".into(),
            });
        }
    }

    // Convert UTF-16 to String. buffer_used is in bytes.
    let used_u16 = buffer_used as usize / 2;
    let end = if used_u16 > 0 && buffer[used_u16 - 1] == 0 {
        used_u16 - 1 // strip null terminator
    } else {
        used_u16
    };

    Ok(String::from_utf16_lossy(&buffer[..end]))
}
