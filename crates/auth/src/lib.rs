//! `korbly-auth` — pure authorization boundary for the portal.
//!
//! This crate is intentionally decoupled from navigation and storage: it
//! answers "may this role use this feature?" and defines the identity
//! provider seam behind which a real authentication backend would sit.

pub mod authorize;
pub mod identity;
pub mod permissions;

pub use authorize::{audit_denied, can, can_all, can_any, can_str};
pub use identity::{DemoDirectory, IdentityProvider, UserProfile};
pub use permissions::permitted_features;
