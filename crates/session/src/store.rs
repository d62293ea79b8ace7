//! The session store state machine.
//!
//! States: Unauthenticated → Authenticating → Authenticated → Expired, with
//! logout returning to Unauthenticated from anywhere. Every clock-dependent
//! operation takes `now` explicitly so behavior is deterministic under test;
//! the watchdog module supplies wall-clock ticks in production.

use chrono::{DateTime, TimeDelta, Utc};

use korbly_audit::{AuditActor, AuditLogger};
use korbly_auth::{IdentityProvider, UserProfile};
use korbly_core::{Redirect, UserRole, routes};

use crate::storage::{LAST_ACTIVITY_KEY, SESSION_KEY, SessionStorage, StorageError};

/// Minutes of inactivity after which an authenticated session expires.
const IDLE_LIMIT_MINUTES: i64 = 30;

/// Lifecycle state of the client-held session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
}

/// User-input events that reset the inactivity countdown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Click,
    KeyPress,
    Scroll,
    PointerMove,
}

/// Token tying an in-flight login to the store epoch it started in.
///
/// A logout bumps the epoch, so a stale attempt resolving afterwards is
/// discarded instead of resurrecting the session.
#[derive(Debug)]
pub struct LoginAttempt {
    epoch: u64,
    email: String,
}

/// Resolution of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched. Carries the post-login redirect when the login
    /// happened on the login entry point.
    Success { redirect: Option<Redirect> },
    /// Credentials did not match. No retry, no lockout — messaging is the
    /// login form's concern.
    InvalidCredentials,
    /// A logout raced the in-flight login; the resolution was ignored.
    Superseded,
}

impl LoginOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }
}

/// Partial profile fields merged by [`SessionStore::update_user`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub avatar: Option<String>,
}

/// Owner of the session record and the two persisted keys.
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    audit: AuditLogger,
    state: SessionState,
    user: Option<UserProfile>,
    last_activity: Option<DateTime<Utc>>,
    idle_limit: TimeDelta,
    epoch: u64,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S, audit: AuditLogger) -> Self {
        Self {
            storage,
            audit,
            state: SessionState::Unauthenticated,
            user: None,
            last_activity: None,
            idle_limit: TimeDelta::minutes(IDLE_LIMIT_MINUTES),
            epoch: 0,
        }
    }

    /// Override the idle limit (tests and short-lived demo deployments).
    pub fn with_idle_limit(mut self, idle_limit: TimeDelta) -> Self {
        self.idle_limit = idle_limit;
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors — the only sanctioned way to read the current identity
    // ─────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        match self.state {
            SessionState::Authenticated => self.user.as_ref(),
            _ => None,
        }
    }

    pub fn current_role(&self) -> Option<UserRole> {
        self.current_user().map(|user| user.role)
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    fn actor(&self) -> AuditActor {
        match &self.user {
            Some(user) => AuditActor::session(user.id, user.email.clone(), user.role),
            None => AuditActor::anonymous(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Restore
    // ─────────────────────────────────────────────────────────────────────

    /// Attempt to restore a persisted session. Run once at initialization.
    ///
    /// A record that fails to parse is discarded silently (removed from
    /// storage, state stays Unauthenticated) — corruption is never a hard
    /// failure. A restored session already past the idle limit expires
    /// immediately; the returned redirect is the timeout redirect in that
    /// case.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<Option<Redirect>, StorageError> {
        let Some(raw) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };

        let profile: UserProfile = match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::warn!(%error, "discarding corrupt persisted session");
                self.storage.remove(SESSION_KEY)?;
                self.storage.remove(LAST_ACTIVITY_KEY)?;
                return Ok(None);
            }
        };

        let last_activity = self
            .storage
            .get(LAST_ACTIVITY_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or(now);

        self.user = Some(profile);
        self.last_activity = Some(last_activity);
        self.state = SessionState::Authenticated;
        self.audit.session_restored(self.actor());
        tracing::info!(role = ?self.current_role(), "session restored from storage");

        // A stale record must not come back to life.
        self.check_expiry(now)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login
    // ─────────────────────────────────────────────────────────────────────

    /// Start a login attempt, entering Authenticating.
    ///
    /// The returned token must be handed back to [`finish_login`] together
    /// with the provider's resolution.
    pub fn begin_login(&mut self, email: &str) -> LoginAttempt {
        self.state = SessionState::Authenticating;
        LoginAttempt {
            epoch: self.epoch,
            email: email.to_string(),
        }
    }

    /// Resolve a login attempt.
    ///
    /// If a logout happened since [`begin_login`], the attempt is stale and
    /// the resolution is dropped without touching state or storage.
    pub fn finish_login(
        &mut self,
        attempt: LoginAttempt,
        resolved: Option<UserProfile>,
        current_path: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, StorageError> {
        if attempt.epoch != self.epoch {
            tracing::info!(email = %attempt.email, "stale login resolution ignored after logout");
            return Ok(LoginOutcome::Superseded);
        }

        let Some(profile) = resolved else {
            self.audit.login_failed(&attempt.email);
            // A re-login attempt may have started from Authenticated; the
            // previous identity and its persisted record must not outlive
            // the failure.
            self.clear(SessionState::Unauthenticated)?;
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let serialized = serde_json::to_string(&profile)
            .map_err(|e| StorageError::backend(format!("serialize session: {e}")))?;
        self.storage.set(SESSION_KEY, &serialized)?;
        self.storage.set(LAST_ACTIVITY_KEY, &now.to_rfc3339())?;

        self.user = Some(profile);
        self.last_activity = Some(now);
        self.state = SessionState::Authenticated;
        self.audit.login_succeeded(self.actor());

        // Landing on the login page while already authenticated would be a
        // dead end; hop to the role's own dashboard. Only the path
        // component matters: `/login?redirect=...` is still the login page.
        let path_only = current_path
            .split(['?', '#'])
            .next()
            .unwrap_or(current_path);
        let redirect = if path_only == routes::LOGIN_PATH {
            self.current_role().map(Redirect::post_login)
        } else {
            None
        };

        Ok(LoginOutcome::Success { redirect })
    }

    /// Composed login: begin, ask the provider, finish.
    pub async fn login<P: IdentityProvider>(
        &mut self,
        provider: &P,
        email: &str,
        password: &str,
        current_path: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, StorageError> {
        let attempt = self.begin_login(email);
        let resolved = provider.authenticate(email, password).await;
        self.finish_login(attempt, resolved, current_path, now)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Logout and expiry
    // ─────────────────────────────────────────────────────────────────────

    /// Terminate the session and clear persisted state.
    ///
    /// Callable from any state; bumps the epoch so in-flight logins cannot
    /// resurrect the session afterwards.
    pub fn logout(&mut self) -> Result<Redirect, StorageError> {
        if self.user.is_some() {
            self.audit.logout(self.actor());
        }
        self.clear(SessionState::Unauthenticated)?;
        Ok(Redirect::logout())
    }

    /// Expire the session if the idle limit has elapsed.
    ///
    /// Invoked by the watchdog on every tick and by [`restore`].
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> Result<Option<Redirect>, StorageError> {
        if self.state != SessionState::Authenticated {
            return Ok(None);
        }
        let Some(last_activity) = self.last_activity else {
            return Ok(None);
        };
        if now - last_activity < self.idle_limit {
            return Ok(None);
        }

        self.audit.session_expired(self.actor());
        tracing::info!(idle_minutes = (now - last_activity).num_minutes(), "session expired");
        self.clear(SessionState::Expired)?;
        Ok(Some(Redirect::session_timeout()))
    }

    fn clear(&mut self, state: SessionState) -> Result<(), StorageError> {
        self.user = None;
        self.last_activity = None;
        self.state = state;
        self.epoch += 1;
        self.storage.remove(SESSION_KEY)?;
        self.storage.remove(LAST_ACTIVITY_KEY)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Activity and profile updates
    // ─────────────────────────────────────────────────────────────────────

    /// Reset the inactivity countdown. No-op unless Authenticated.
    pub fn record_activity(
        &mut self,
        kind: ActivityKind,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if self.state != SessionState::Authenticated {
            return Ok(());
        }
        tracing::trace!(?kind, "activity");
        self.last_activity = Some(now);
        self.storage.set(LAST_ACTIVITY_KEY, &now.to_rfc3339())
    }

    /// Merge partial profile fields and re-persist. No-op unless
    /// Authenticated.
    pub fn update_user(&mut self, update: ProfileUpdate) -> Result<(), StorageError> {
        if self.state != SessionState::Authenticated {
            return Ok(());
        }
        let Some(user) = self.user.as_mut() else {
            return Ok(());
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(organization) = update.organization {
            user.organization = organization;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }

        let serialized = serde_json::to_string(user)
            .map_err(|e| StorageError::backend(format!("serialize session: {e}")))?;
        self.storage.set(SESSION_KEY, &serialized)
    }

    /// Shared-state view of the backing storage (tests).
    #[cfg(test)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}
