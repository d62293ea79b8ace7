//! Audit event model.
//!
//! Events are append-only from this core's perspective: once constructed and
//! handed to a sink they are never mutated or deleted here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use korbly_core::{UserId, UserRole};

/// Who performed (or attempted) the audited action.
///
/// All fields are optional because some events predate a session: a failed
/// login knows only the attempted email, and a restore-discard knows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditActor {
    pub id: Option<UserId>,
    pub email: Option<String>,
    /// Raw role string; may be an unparsed claim, so it is not `UserRole`.
    pub role: Option<String>,
}

impl AuditActor {
    /// Actor for an authenticated session.
    pub fn session(id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Some(id),
            email: Some(email.into()),
            role: Some(role.as_str().to_string()),
        }
    }

    /// Actor known only by the email they presented.
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
            role: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Kind of security-relevant event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    AccessDenied,
    ModuleAccess,
    LoginSucceeded,
    LoginFailed,
    SessionRestored,
    SessionExpired,
    Logout,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::AccessDenied => "access_denied",
            AuditKind::ModuleAccess => "module_access",
            AuditKind::LoginSucceeded => "login_succeeded",
            AuditKind::LoginFailed => "login_failed",
            AuditKind::SessionRestored => "session_restored",
            AuditKind::SessionExpired => "session_expired",
            AuditKind::Logout => "logout",
        }
    }
}

/// Why access was denied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    InvalidUrlParameter,
    UserTypeMismatch,
    InsufficientPermissions,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::InvalidUrlParameter => "invalid_url_parameter",
            DenialReason::UserTypeMismatch => "user_type_mismatch",
            DenialReason::InsufficientPermissions => "insufficient_permissions",
        }
    }
}

/// An immutable record of a security-relevant decision or action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub actor: AuditActor,
    pub kind: AuditKind,
    /// Free-form context. `BTreeMap` keeps serialized output deterministic.
    pub details: BTreeMap<String, serde_json::Value>,
    pub resource_id: Option<String>,
    pub resource_kind: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(actor: AuditActor, kind: AuditKind, occurred_at: DateTime<Utc>) -> Self {
        Self {
            actor,
            kind,
            details: BTreeMap::new(),
            resource_id: None,
            resource_kind: None,
            occurred_at,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_resource(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.resource_kind = Some(kind.into());
        self.resource_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_details() {
        let event = AuditEvent::new(AuditActor::anonymous(), AuditKind::AccessDenied, Utc::now())
            .with_detail("reason", DenialReason::UserTypeMismatch.as_str())
            .with_detail("claimed", "insurance")
            .with_resource("module", "Portfolio");

        assert_eq!(event.details.len(), 2);
        assert_eq!(event.resource_kind.as_deref(), Some("module"));
        assert_eq!(event.resource_id.as_deref(), Some("Portfolio"));
    }

    #[test]
    fn kinds_serialize_snake_case() {
        let json = serde_json::to_string(&AuditKind::AccessDenied).unwrap();
        assert_eq!(json, "\"access_denied\"");
        assert_eq!(AuditKind::ModuleAccess.as_str(), "module_access");
    }
}
