//! Core domain modules for wfplog.
//!
//! Contains the log-entry data model, the raw-record abstraction, the
//! positional-schema decoder, the audit-policy-coupled subscription, and the
//! watcher façade.

pub mod decoder;
pub mod log_entry;
pub mod path_map;
pub mod raw_record;
pub mod subscription;
pub mod watcher;
