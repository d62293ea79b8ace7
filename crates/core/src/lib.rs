//! `korbly-core` — domain foundation for the Korbly portal core.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the closed role and feature registries, strongly-typed identifiers, the
//! domain error model, and the static route tables every layer above shares.

pub mod error;
pub mod feature;
pub mod id;
pub mod role;
pub mod routes;

pub use error::{DomainError, DomainResult};
pub use feature::Feature;
pub use id::UserId;
pub use role::UserRole;
pub use routes::{Redirect, RedirectReason};
