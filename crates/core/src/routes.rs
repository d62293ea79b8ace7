//! Static route tables and the redirect decision type.
//!
//! The portal core never renders anything; the only navigation-visible
//! outputs are the paths below and [`Redirect`] values pointing at them.

use serde::Serialize;

use crate::feature::Feature;
use crate::role::UserRole;

/// Login entry point. Post-login routing and every guard denial funnel
/// through or away from this path.
pub const LOGIN_PATH: &str = "/login";

/// Safe fallback target when URL construction aborts.
pub const ROOT_PATH: &str = "/";

/// Generic dashboard for callers holding no role-specific mapping.
pub const GENERIC_DASHBOARD_PATH: &str = "/dashboard";

/// Role-specific dashboard path.
///
/// Every registry role has an entry; [`dashboard_or_fallback`] covers the
/// unauthenticated case.
pub fn dashboard_path(role: UserRole) -> &'static str {
    match role {
        UserRole::PensionFund => "/pension/dashboard",
        UserRole::Insurance => "/insurance/dashboard",
        UserRole::Dfi => "/dfi/dashboard",
        UserRole::AssetManager => "/asset-manager/dashboard",
        UserRole::SovereignFund => "/sovereign/dashboard",
        UserRole::Hnwi => "/hnwi/dashboard",
        UserRole::InstitutionalBorrower => "/borrower/dashboard",
        UserRole::Admin => "/admin/dashboard",
        UserRole::Regulator => "/regulator/dashboard",
    }
}

/// Dashboard path for an optional role, falling back to the generic path.
pub fn dashboard_or_fallback(role: Option<UserRole>) -> &'static str {
    role.map(dashboard_path).unwrap_or(GENERIC_DASHBOARD_PATH)
}

/// Base path of a module; role-scoped module URLs append the user type
/// segment (`<module_path>/<role>`).
pub fn module_path(feature: Feature) -> &'static str {
    match feature {
        Feature::Portfolio => "/modules/portfolio",
        Feature::Syndication => "/modules/syndication",
        Feature::Valuation => "/modules/valuation",
        Feature::Documentation => "/modules/documentation",
        Feature::Compliance => "/modules/compliance",
        Feature::CreditEngine => "/modules/credit-engine",
    }
}

/// Why a redirect was issued.
///
/// Deliberately coarse: invalid parameters, role mismatches and permission
/// misses all look identical to the user (silent redirection); the reason is
/// for the embedding application and the audit trail, not for display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    LoginRequired,
    InvalidParameter,
    RoleMismatch,
    InsufficientPermissions,
    PostLogin,
    Logout,
    SessionTimeout,
}

/// A terminal navigation decision: send the user to `path` and stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub path: String,
    pub reason: RedirectReason,
}

impl Redirect {
    /// Send an unauthenticated caller to login, preserving the originally
    /// requested path as a return target.
    pub fn login_required(requested_path: &str) -> Self {
        Self {
            path: format!(
                "{}?redirect={}",
                LOGIN_PATH,
                urlencoding::encode(requested_path)
            ),
            reason: RedirectReason::LoginRequired,
        }
    }

    /// Plain return to the login entry point after an explicit logout.
    pub fn logout() -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            reason: RedirectReason::Logout,
        }
    }

    /// Return to login with the inactivity-timeout indicator.
    pub fn session_timeout() -> Self {
        Self {
            path: format!("{}?timeout=true", LOGIN_PATH),
            reason: RedirectReason::SessionTimeout,
        }
    }

    /// Send an authenticated user to their own dashboard.
    pub fn own_dashboard(role: Option<UserRole>, reason: RedirectReason) -> Self {
        Self {
            path: dashboard_or_fallback(role).to_string(),
            reason,
        }
    }

    /// Post-login hop from the login page to the role's dashboard.
    pub fn post_login(role: UserRole) -> Self {
        Self {
            path: dashboard_path(role).to_string(),
            reason: RedirectReason::PostLogin,
        }
    }
}
