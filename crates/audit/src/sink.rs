//! Audit delivery boundary.
//!
//! The core only constructs and emits events; where they go (log pipeline,
//! SIEM, database) is the sink implementation's concern.

use std::sync::{Arc, Mutex};

use crate::event::{AuditEvent, AuditKind};

/// Receives audit events.
///
/// Recording must not fail from the emitter's point of view: a sink that can
/// lose events (e.g. a full buffer) handles that internally. Security
/// decisions never block on audit delivery.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Sink that forwards events to the `tracing` pipeline as structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, event: &AuditEvent) {
        let details = serde_json::to_string(&event.details).unwrap_or_default();
        match event.kind {
            AuditKind::AccessDenied => tracing::warn!(
                kind = event.kind.as_str(),
                actor_id = ?event.actor.id,
                actor_email = event.actor.email.as_deref(),
                actor_role = event.actor.role.as_deref(),
                resource_kind = event.resource_kind.as_deref(),
                resource_id = event.resource_id.as_deref(),
                %details,
                "audit"
            ),
            _ => tracing::info!(
                kind = event.kind.as_str(),
                actor_id = ?event.actor.id,
                actor_email = event.actor.email.as_deref(),
                actor_role = event.actor.role.as_deref(),
                resource_kind = event.resource_kind.as_deref(),
                resource_id = event.resource_id.as_deref(),
                %details,
                "audit"
            ),
        }
    }
}

/// In-memory sink for tests and embedding without a log pipeline.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink poisoned").clone()
    }

    pub fn kinds(&self) -> Vec<AuditKind> {
        self.snapshot().into_iter().map(|e| e.kind).collect()
    }
}

impl AuditSink for MemorySink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().expect("audit sink poisoned").push(event.clone());
    }
}
