//! Emission facade over an [`AuditSink`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::event::{AuditActor, AuditEvent, AuditKind, DenialReason};
use crate::sink::{AuditSink, TracingSink};

/// Cheap-to-clone handle used by every component that emits audit events.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Logger wired to the process `tracing` pipeline.
    pub fn to_tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    pub fn emit(&self, event: AuditEvent) {
        self.sink.record(&event);
    }

    /// Record a denied access attempt.
    pub fn access_denied(
        &self,
        actor: AuditActor,
        reason: DenialReason,
        details: BTreeMap<String, serde_json::Value>,
    ) {
        let mut event = AuditEvent::new(actor, AuditKind::AccessDenied, Utc::now())
            .with_detail("reason", reason.as_str());
        event.details.extend(details);
        self.emit(event);
    }

    /// Record a successful module entry.
    pub fn module_access(&self, actor: AuditActor, module: &str) {
        self.emit(
            AuditEvent::new(actor, AuditKind::ModuleAccess, Utc::now())
                .with_resource("module", module),
        );
    }

    pub fn login_succeeded(&self, actor: AuditActor) {
        self.emit(AuditEvent::new(actor, AuditKind::LoginSucceeded, Utc::now()));
    }

    pub fn login_failed(&self, email: &str) {
        self.emit(AuditEvent::new(
            AuditActor::email_only(email),
            AuditKind::LoginFailed,
            Utc::now(),
        ));
    }

    pub fn session_restored(&self, actor: AuditActor) {
        self.emit(AuditEvent::new(actor, AuditKind::SessionRestored, Utc::now()));
    }

    pub fn session_expired(&self, actor: AuditActor) {
        self.emit(AuditEvent::new(actor, AuditKind::SessionExpired, Utc::now()));
    }

    pub fn logout(&self, actor: AuditActor) {
        self.emit(AuditEvent::new(actor, AuditKind::Logout, Utc::now()));
    }
}

impl core::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}
