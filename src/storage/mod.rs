//! Storage layer for the Command Clinic telemetry core
//!
//! Two small persistent stores live side by side in the support directory:
//! the day-partitioned JSONL event log and the single-document alias
//! registry.

pub mod aliases;
pub mod event_log;

pub use aliases::{AliasRegistry, ALIASES_FILE, DEFAULT_ALIASES, MAX_ALIASES};
pub use event_log::EventStore;
