//! `korbly-audit` — structured security audit trail.
//!
//! This crate constructs and emits audit events; storage and delivery belong
//! to an external collaborator behind the [`AuditSink`] trait.

pub mod event;
pub mod logger;
pub mod sink;

pub use event::{AuditActor, AuditEvent, AuditKind, DenialReason};
pub use logger::AuditLogger;
pub use sink::{AuditSink, MemorySink, TracingSink};
