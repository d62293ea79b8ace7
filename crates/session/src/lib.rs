//! `korbly-session` — session lifecycle for the portal core.
//!
//! Owns the client-held session record end to end: restore on start, the
//! async login handshake (with its logout-race guard), activity tracking,
//! inactivity expiry, and post-login routing. This crate is the **sole
//! writer** of the persisted session keys; everything above it reads the
//! current role through [`SessionStore`] accessors, never a cached copy.

pub mod storage;
pub mod store;
pub mod watchdog;

pub use storage::{LAST_ACTIVITY_KEY, MemoryStorage, SESSION_KEY, SessionStorage, StorageError};
pub use store::{
    ActivityKind, LoginAttempt, LoginOutcome, ProfileUpdate, SessionState, SessionStore,
};
pub use watchdog::{WatchdogConfig, WatchdogHandle, spawn_watchdog};
