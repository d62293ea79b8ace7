//! The secure route guard.
//!
//! One evaluation per navigation, in a fixed order: authentication, claim
//! sanitization, role match, permission. The order is load-bearing — an
//! unauthenticated caller is bounced before any check that could reveal
//! whether a route exists. Every redirect is terminal for the attempt.

use std::collections::BTreeMap;
use std::str::FromStr;

use korbly_audit::{AuditActor, AuditLogger, DenialReason};
use korbly_auth::can;
use korbly_core::{Feature, Redirect, RedirectReason, UserRole};
use korbly_session::{SessionStorage, SessionStore};

use crate::sanitize::sanitize;

/// Fixed module-name → feature table.
///
/// Names are the display names the navigation shell uses; anything outside
/// the table is denied, not errored.
pub fn module_feature(name: &str) -> Option<Feature> {
    match name {
        "Portfolio" => Some(Feature::Portfolio),
        "Syndication" => Some(Feature::Syndication),
        "Valuation" => Some(Feature::Valuation),
        "Documentation" => Some(Feature::Documentation),
        "Compliance" => Some(Feature::Compliance),
        "Credit Engine" => Some(Feature::CreditEngine),
        _ => None,
    }
}

/// A navigation event entering the guard.
#[derive(Debug, Clone)]
pub struct NavigationRequest<'a> {
    /// Full originally requested path (return target after login).
    pub requested_path: &'a str,
    /// Untrusted role claim from the URL (e.g. the `:userType` segment).
    pub role_claim: Option<&'a str>,
    /// Display name of the module being entered.
    pub module: &'a str,
    /// Whether the resource requires an authenticated session.
    pub requires_auth: bool,
}

/// Terminal outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Render the module.
    Allow { feature: Feature },
    /// Do not render; navigate to the redirect target instead.
    Redirect(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow { .. })
    }
}

/// Per-navigation authorization orchestrator.
pub struct RouteGuard {
    audit: AuditLogger,
}

impl RouteGuard {
    pub fn new(audit: AuditLogger) -> Self {
        Self { audit }
    }

    /// Evaluate one navigation attempt.
    ///
    /// Reads the current identity from the session store on every call —
    /// never from a cached copy — so a logout or role change is visible
    /// immediately.
    pub fn evaluate<S: SessionStorage>(
        &self,
        session: &SessionStore<S>,
        request: &NavigationRequest<'_>,
    ) -> GuardDecision {
        // 1. Authentication.
        if request.requires_auth && !session.is_authenticated() {
            return GuardDecision::Redirect(Redirect::login_required(request.requested_path));
        }

        let session_role = session.current_role();
        let actor = match session.current_user() {
            Some(user) => AuditActor::session(user.id, user.email.clone(), user.role),
            None => AuditActor::anonymous(),
        };

        // 2. Sanitize the route identity claim and require a registry role.
        let claimed_role = sanitize(request.role_claim)
            .and_then(|cleaned| UserRole::from_str(&cleaned).ok());
        let Some(claimed_role) = claimed_role else {
            self.audit.access_denied(
                actor,
                DenialReason::InvalidUrlParameter,
                detail("claim", request.role_claim.unwrap_or_default()),
            );
            return GuardDecision::Redirect(Redirect::own_dashboard(
                session_role,
                RedirectReason::InvalidParameter,
            ));
        };

        // 3. The claim must match the session's actual role: a logged-in
        // user must not reach another role's dashboard by editing the URL.
        if Some(claimed_role) != session_role {
            let mut details = detail("claimed_role", claimed_role.as_str());
            details.insert(
                "session_role".to_string(),
                serde_json::Value::from(
                    session_role.map(|r| r.as_str()).unwrap_or_default(),
                ),
            );
            self.audit
                .access_denied(actor, DenialReason::UserTypeMismatch, details);
            return GuardDecision::Redirect(Redirect::own_dashboard(
                session_role,
                RedirectReason::RoleMismatch,
            ));
        }

        // 4 + 5. Resolve the module and check the matrix. Unknown modules
        // fail closed and are indistinguishable from permission misses.
        let feature = module_feature(request.module);
        let permitted = feature.is_some_and(|feature| can(session_role, feature));
        if !permitted {
            let mut details = detail("module", request.module);
            if let Some(feature) = feature {
                details.insert(
                    "feature".to_string(),
                    serde_json::Value::from(feature.as_str()),
                );
            }
            self.audit
                .access_denied(actor, DenialReason::InsufficientPermissions, details);
            return GuardDecision::Redirect(Redirect::own_dashboard(
                session_role,
                RedirectReason::InsufficientPermissions,
            ));
        }

        // 6. Allowed; leave a module-access trace.
        self.audit.module_access(actor, request.module);
        GuardDecision::Allow {
            feature: feature.expect("permitted implies resolved"),
        }
    }
}

fn detail(key: &str, value: &str) -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([(key.to_string(), serde_json::Value::from(value))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use korbly_audit::{AuditKind, MemorySink};
    use korbly_auth::DemoDirectory;
    use korbly_session::MemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;

    async fn login_as(
        email: &str,
        password: &str,
    ) -> (SessionStore<MemoryStorage>, Arc<MemorySink>) {
        let sink = MemorySink::new();
        let mut store =
            SessionStore::new(MemoryStorage::new(), AuditLogger::new(sink.clone()));
        let provider = DemoDirectory::with_latency(Duration::ZERO);
        let outcome = store
            .login(&provider, email, password, "/login", Utc::now())
            .await
            .unwrap();
        assert!(outcome.succeeded());
        (store, sink)
    }

    fn request<'a>(path: &'a str, claim: &'a str, module: &'a str) -> NavigationRequest<'a> {
        NavigationRequest {
            requested_path: path,
            role_claim: Some(claim),
            module,
            requires_auth: true,
        }
    }

    #[tokio::test]
    async fn unauthenticated_is_sent_to_login_with_return_target() {
        let sink = MemorySink::new();
        let store = SessionStore::new(MemoryStorage::new(), AuditLogger::new(sink.clone()));
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        let decision = guard.evaluate(
            &store,
            &request("/modules/portfolio/pension_fund", "pension_fund", "Portfolio"),
        );

        let GuardDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(
            redirect.path,
            "/login?redirect=%2Fmodules%2Fportfolio%2Fpension_fund"
        );
        // No actor yet, so nothing lands in the audit trail.
        assert!(sink.snapshot().iter().all(|e| e.kind != AuditKind::AccessDenied));
    }

    #[tokio::test]
    async fn matching_claim_and_permitted_module_is_allowed() {
        let (store, sink) = login_as("pension@demo.korbly.com", "PensionFund1!").await;
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        let decision = guard.evaluate(
            &store,
            &request("/modules/portfolio/pension_fund", "pension_fund", "Portfolio"),
        );

        assert_eq!(
            decision,
            GuardDecision::Allow {
                feature: Feature::Portfolio
            }
        );
        assert!(sink.kinds().contains(&AuditKind::ModuleAccess));
    }

    #[tokio::test]
    async fn role_mismatch_redirects_to_own_dashboard() {
        let (store, sink) = login_as("pension@demo.korbly.com", "PensionFund1!").await;
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        // Pension-fund user edits the URL to the insurance dashboard.
        let decision = guard.evaluate(
            &store,
            &request("/modules/portfolio/insurance", "insurance", "Portfolio"),
        );

        let GuardDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        // Own dashboard, not the claimed role's.
        assert_eq!(redirect.path, "/pension/dashboard");
        assert_eq!(redirect.reason, RedirectReason::RoleMismatch);

        let denied = sink
            .snapshot()
            .into_iter()
            .find(|e| e.kind == AuditKind::AccessDenied)
            .unwrap();
        assert_eq!(
            denied.details.get("reason").and_then(|v| v.as_str()),
            Some("user_type_mismatch")
        );
    }

    #[tokio::test]
    async fn tampered_claim_is_an_invalid_parameter() {
        let (store, sink) = login_as("admin@korbly.com", "Admin@2024").await;
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        let decision = guard.evaluate(
            &store,
            &request("/modules/portfolio/..%2Fetc", "../etc", "Portfolio"),
        );

        let GuardDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.path, "/admin/dashboard");
        assert_eq!(redirect.reason, RedirectReason::InvalidParameter);

        let denied = sink
            .snapshot()
            .into_iter()
            .find(|e| e.kind == AuditKind::AccessDenied)
            .unwrap();
        assert_eq!(
            denied.details.get("reason").and_then(|v| v.as_str()),
            Some("invalid_url_parameter")
        );
    }

    #[tokio::test]
    async fn hnwi_is_denied_syndication() {
        let (store, sink) = login_as("hnwi@demo.korbly.com", "Private#1").await;
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        let decision = guard.evaluate(
            &store,
            &request("/modules/syndication/hnwi", "hnwi", "Syndication"),
        );

        let GuardDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.path, "/hnwi/dashboard");
        assert_eq!(redirect.reason, RedirectReason::InsufficientPermissions);
    }

    #[tokio::test]
    async fn unknown_module_fails_closed() {
        let (store, sink) = login_as("admin@korbly.com", "Admin@2024").await;
        let guard = RouteGuard::new(AuditLogger::new(sink.clone()));

        let decision = guard.evaluate(
            &store,
            &request("/modules/secret/admin", "admin", "Secret Lab"),
        );

        let GuardDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        // Indistinguishable from an ordinary permission miss.
        assert_eq!(redirect.reason, RedirectReason::InsufficientPermissions);
        let denied = sink
            .snapshot()
            .into_iter()
            .find(|e| e.kind == AuditKind::AccessDenied)
            .unwrap();
        assert_eq!(
            denied.details.get("reason").and_then(|v| v.as_str()),
            Some("insufficient_permissions")
        );
    }

    #[test]
    fn module_table_is_exact_match_only() {
        assert_eq!(module_feature("Credit Engine"), Some(Feature::CreditEngine));
        assert_eq!(module_feature("credit engine"), None);
        assert_eq!(module_feature("Portfolio "), None);
        assert_eq!(module_feature(""), None);
    }
}
