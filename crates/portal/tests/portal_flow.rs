//! End-to-end portal flow: login, guard evaluation, expiry, logout.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;

use korbly_audit::{AuditKind, AuditLogger, MemorySink};
use korbly_auth::DemoDirectory;
use korbly_core::{Feature, RedirectReason, UserRole, routes};
use korbly_portal::{GuardDecision, NavigationRequest, RouteGuard, build_secure_url};
use korbly_session::{
    ActivityKind, MemoryStorage, SESSION_KEY, SessionState, SessionStore, WatchdogConfig,
    spawn_watchdog,
};

fn provider() -> DemoDirectory {
    DemoDirectory::with_latency(Duration::ZERO)
}

fn portal() -> (SessionStore<MemoryStorage>, RouteGuard, Arc<MemorySink>) {
    let sink = MemorySink::new();
    let logger = AuditLogger::new(sink.clone());
    let store = SessionStore::new(MemoryStorage::new(), logger.clone());
    (store, RouteGuard::new(logger), sink)
}

#[tokio::test]
async fn full_login_navigate_logout_cycle() {
    let (mut store, guard, sink) = portal();

    // Landing on a protected module unauthenticated bounces to login.
    let decision = guard.evaluate(
        &store,
        &NavigationRequest {
            requested_path: "/modules/valuation/insurance",
            role_claim: Some("insurance"),
            module: "Valuation",
            requires_auth: true,
        },
    );
    assert!(matches!(
        decision,
        GuardDecision::Redirect(ref r) if r.reason == RedirectReason::LoginRequired
    ));

    // Login from the login page redirects to the role dashboard.
    let outcome = store
        .login(
            &provider(),
            "insurance@demo.korbly.com",
            "Insure#2024",
            routes::LOGIN_PATH,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(outcome.succeeded());
    assert_eq!(store.current_role(), Some(UserRole::Insurance));

    // The same navigation now renders.
    let decision = guard.evaluate(
        &store,
        &NavigationRequest {
            requested_path: "/modules/valuation/insurance",
            role_claim: Some("insurance"),
            module: "Valuation",
            requires_auth: true,
        },
    );
    assert_eq!(
        decision,
        GuardDecision::Allow {
            feature: Feature::Valuation
        }
    );

    // Role-scoped module URLs are built through the sanitizer.
    let url = build_secure_url(
        "/modules/valuation/:userType",
        &BTreeMap::from([("userType", "insurance")]),
    );
    assert_eq!(url, "/modules/valuation/insurance");

    // Logout clears the persisted record and bounces back to login.
    let redirect = store.logout().unwrap();
    assert_eq!(redirect.path, routes::LOGIN_PATH);
    assert_eq!(store.state(), SessionState::Unauthenticated);

    // Guard decisions follow the store immediately: no stale identity.
    let decision = guard.evaluate(
        &store,
        &NavigationRequest {
            requested_path: "/modules/valuation/insurance",
            role_claim: Some("insurance"),
            module: "Valuation",
            requires_auth: true,
        },
    );
    assert!(!decision.is_allowed());

    let kinds = sink.kinds();
    assert!(kinds.contains(&AuditKind::LoginSucceeded));
    assert!(kinds.contains(&AuditKind::ModuleAccess));
    assert!(kinds.contains(&AuditKind::Logout));
}

#[tokio::test]
async fn restored_session_feeds_the_guard() {
    let sink = MemorySink::new();
    let logger = AuditLogger::new(sink.clone());

    // First process: login persists the session record.
    let mut first = SessionStore::new(MemoryStorage::new(), logger.clone());
    first
        .login(
            &provider(),
            "dfi@demo.korbly.com",
            "Develop!2024",
            routes::LOGIN_PATH,
            Utc::now(),
        )
        .await
        .unwrap();
    let raw = MemoryStorage::with_entry(
        SESSION_KEY,
        &serde_json::to_string(first.current_user().unwrap()).unwrap(),
    );

    // Second process: restore and navigate.
    let mut second = SessionStore::new(raw, logger.clone());
    let redirect = second.restore(Utc::now()).unwrap();
    assert!(redirect.is_none());
    assert_eq!(second.current_role(), Some(UserRole::Dfi));

    let guard = RouteGuard::new(logger);
    let decision = guard.evaluate(
        &second,
        &NavigationRequest {
            requested_path: "/modules/credit-engine/dfi",
            role_claim: Some("dfi"),
            module: "Credit Engine",
            requires_auth: true,
        },
    );
    assert_eq!(
        decision,
        GuardDecision::Allow {
            feature: Feature::CreditEngine
        }
    );
    assert!(sink.kinds().contains(&AuditKind::SessionRestored));
}

#[tokio::test(start_paused = true)]
async fn watchdog_expiry_locks_out_navigation() {
    let (mut store, _guard, sink) = portal();
    store
        .login(
            &provider(),
            "sovereign@demo.korbly.com",
            "Reserve$2024",
            routes::LOGIN_PATH,
            Utc::now(),
        )
        .await
        .unwrap();

    // Zero idle limit so the first wall-clock tick expires the session.
    let store = Arc::new(Mutex::new(store.with_idle_limit(TimeDelta::zero())));
    let (handle, mut redirects) = spawn_watchdog(
        store.clone(),
        WatchdogConfig {
            poll_interval: Duration::from_millis(10),
        },
    );

    tokio::time::advance(Duration::from_millis(25)).await;
    let redirect = redirects.recv().await.unwrap();
    assert_eq!(redirect.path, "/login?timeout=true");
    handle.shutdown();

    let store = store.lock().await;
    assert_eq!(store.state(), SessionState::Expired);

    let guard = RouteGuard::new(AuditLogger::new(sink.clone()));
    let decision = guard.evaluate(
        &store,
        &NavigationRequest {
            requested_path: "/modules/portfolio/sovereign_fund",
            role_claim: Some("sovereign_fund"),
            module: "Portfolio",
            requires_auth: true,
        },
    );
    assert!(matches!(
        decision,
        GuardDecision::Redirect(ref r) if r.reason == RedirectReason::LoginRequired
    ));
    assert!(sink.kinds().contains(&AuditKind::SessionExpired));
}

#[tokio::test]
async fn activity_keeps_a_session_alive_across_checks() {
    let (mut store, _guard, _sink) = portal();
    let t0 = Utc::now();
    store
        .login(&provider(), "asset@demo.korbly.com", "Alloc8te!", routes::LOGIN_PATH, t0)
        .await
        .unwrap();

    for minute in [10, 20, 29] {
        store
            .record_activity(ActivityKind::Scroll, t0 + TimeDelta::minutes(minute))
            .unwrap();
        assert!(store.check_expiry(t0 + TimeDelta::minutes(minute + 1)).unwrap().is_none());
    }

    // 29 minutes of activity-silence after the last event: expired.
    let redirect = store.check_expiry(t0 + TimeDelta::minutes(59)).unwrap();
    assert!(redirect.is_some());
}
