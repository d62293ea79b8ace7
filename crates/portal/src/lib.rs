//! `korbly-portal` — navigation-facing security layer.
//!
//! Combines the URL parameter sanitizer with the secure route guard that
//! decides, per navigation, whether a module renders or the user is
//! redirected.

pub mod guard;
pub mod sanitize;

pub use guard::{GuardDecision, NavigationRequest, RouteGuard, module_feature};
pub use sanitize::{build_secure_url, is_allowed, is_path_safe, module_url, sanitize};
