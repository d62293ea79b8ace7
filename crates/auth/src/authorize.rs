//! Authorization service: permission checks over the current role.
//!
//! All entry points take `Option<UserRole>` — `None` is an unauthenticated
//! caller and always denies. Checks are pure; the audit side effect is
//! caller-invoked via [`audit_denied`].

use std::collections::BTreeMap;
use std::str::FromStr;

use korbly_audit::{AuditActor, AuditLogger, DenialReason};
use korbly_core::{Feature, UserRole};

use crate::permissions::permitted_features;

/// May `role` use `feature`?
pub fn can(role: Option<UserRole>, feature: Feature) -> bool {
    match role {
        Some(role) => permitted_features(role).contains(&feature),
        None => false,
    }
}

/// May `role` use every feature in `features`?
///
/// Vacuously true for an empty list when a role is present (standard logical
/// convention); still false when unauthenticated.
pub fn can_all(role: Option<UserRole>, features: &[Feature]) -> bool {
    match role {
        Some(role) => {
            let permitted = permitted_features(role);
            features.iter().all(|feature| permitted.contains(feature))
        }
        None => false,
    }
}

/// May `role` use at least one feature in `features`? False for empty input.
pub fn can_any(role: Option<UserRole>, features: &[Feature]) -> bool {
    match role {
        Some(role) => {
            let permitted = permitted_features(role);
            features.iter().any(|feature| permitted.contains(feature))
        }
        None => false,
    }
}

/// String-keyed convenience for callers holding a raw role value.
///
/// Strings outside the registry do not parse and therefore deny — this is
/// the "unknown role maps to the empty set" rule.
pub fn can_str(role: &str, feature: Feature) -> bool {
    can(UserRole::from_str(role).ok(), feature)
}

/// Record an `access_denied` / `insufficient_permissions` event for a failed
/// permission check.
pub fn audit_denied(logger: &AuditLogger, actor: AuditActor, feature: Feature) {
    let mut details = BTreeMap::new();
    details.insert(
        "feature".to_string(),
        serde_json::Value::from(feature.as_str()),
    );
    logger.access_denied(actor, DenialReason::InsufficientPermissions, details);
}
