//! Scripted walkthrough of the portal core: login, guarded navigation,
//! denial, inactivity expiry. Useful for eyeballing the audit stream.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;

use korbly_audit::AuditLogger;
use korbly_auth::DemoDirectory;
use korbly_core::routes;
use korbly_portal::{GuardDecision, NavigationRequest, RouteGuard};
use korbly_session::{MemoryStorage, SessionStore, WatchdogConfig, spawn_watchdog};

#[tokio::main]
async fn main() {
    korbly_observability::init();

    let audit = AuditLogger::to_tracing();
    let provider = DemoDirectory::new();
    let guard = RouteGuard::new(audit.clone());

    let mut store = SessionStore::new(MemoryStorage::new(), audit.clone())
        // Demo-length idle limit so the expiry shows up within seconds.
        .with_idle_limit(TimeDelta::seconds(3));
    if let Ok(Some(redirect)) = store.restore(Utc::now()) {
        tracing::info!(path = %redirect.path, "restore expired, would redirect");
    }

    let outcome = store
        .login(
            &provider,
            "pension@demo.korbly.com",
            "PensionFund1!",
            routes::LOGIN_PATH,
            Utc::now(),
        )
        .await
        .expect("demo storage cannot fail");
    tracing::info!(?outcome, "login resolved");

    for (claim, module) in [
        ("pension_fund", "Portfolio"),
        ("pension_fund", "Credit Engine"),
        ("insurance", "Portfolio"),
        ("../etc", "Portfolio"),
    ] {
        let decision = guard.evaluate(
            &store,
            &NavigationRequest {
                requested_path: "/modules/portfolio/pension_fund",
                role_claim: Some(claim),
                module,
                requires_auth: true,
            },
        );
        match decision {
            GuardDecision::Allow { feature } => {
                tracing::info!(%feature, module, "navigation allowed");
            }
            GuardDecision::Redirect(redirect) => {
                tracing::info!(path = %redirect.path, reason = ?redirect.reason, module, "navigation redirected");
            }
        }
    }

    let store = Arc::new(Mutex::new(store));
    let (watchdog, mut redirects) = spawn_watchdog(
        store.clone(),
        WatchdogConfig {
            poll_interval: Duration::from_millis(500),
        },
    );

    if let Some(redirect) = redirects.recv().await {
        tracing::info!(path = %redirect.path, "session expired by watchdog");
    }
    watchdog.shutdown();
}
