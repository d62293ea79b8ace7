//! Identity provider boundary and the demo credential directory.
//!
//! The portal core authenticates against [`IdentityProvider`]; the bundled
//! [`DemoDirectory`] is a placeholder for a real backend and is the only
//! implementation in this repository. It is explicitly prototype-grade:
//! plaintext credentials, no lockout, no throttling.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use korbly_core::{UserId, UserRole};

/// Authenticated identity and profile fields carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Authentication backend seam.
///
/// A production deployment swaps in a real implementation here without
/// touching the authorization service or the route guard.
pub trait IdentityProvider {
    /// Resolve credentials to a profile, or `None` on mismatch.
    ///
    /// Mismatch is a value, not an error: the caller (login form) owns the
    /// user-visible messaging.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Option<UserProfile>> + Send;
}

struct DemoCredential {
    email: &'static str,
    password: &'static str,
    profile: UserProfile,
}

/// Fixed, ordered demo identity table.
///
/// Matching is case-sensitive exact equality on both email and password and
/// the **first** matching entry wins; the table intentionally carries a
/// duplicate email with a different password and role, mirroring the
/// observed demo data set.
pub struct DemoDirectory {
    entries: Vec<DemoCredential>,
    latency: Duration,
}

/// Simulated network latency before a login resolves.
const DEMO_LOGIN_LATENCY: Duration = Duration::from_millis(400);

fn demo_profile(
    seq: u128,
    email: &str,
    name: &str,
    role: UserRole,
    organization: &str,
) -> UserProfile {
    UserProfile {
        // Stable per-entry IDs so restored sessions keep their identity
        // across processes.
        id: UserId::from_uuid(Uuid::from_u128(seq)),
        email: email.to_string(),
        name: name.to_string(),
        role,
        organization: organization.to_string(),
        avatar: None,
    }
}

impl DemoDirectory {
    pub fn new() -> Self {
        Self::with_latency(DEMO_LOGIN_LATENCY)
    }

    /// Directory with custom resolution latency (zero for tests).
    pub fn with_latency(latency: Duration) -> Self {
        let mut entries = Vec::new();
        let mut push = |email: &'static str,
                        password: &'static str,
                        seq: u128,
                        name: &str,
                        role: UserRole,
                        organization: &str| {
            entries.push(DemoCredential {
                email,
                password,
                profile: demo_profile(seq, email, name, role, organization),
            });
        };

        push(
            "admin@korbly.com",
            "Admin@2024",
            0x01,
            "Ama Serwaa",
            UserRole::Admin,
            "Korbly Platform Operations",
        );
        push(
            "pension@demo.korbly.com",
            "PensionFund1!",
            0x02,
            "Kwame Osei",
            UserRole::PensionFund,
            "Horizon Pension Trust",
        );
        // Duplicate email, different password and role. First match wins,
        // so this entry is only reachable with its own password.
        push(
            "pension@demo.korbly.com",
            "Legacy#2023",
            0x03,
            "Kwame Osei",
            UserRole::AssetManager,
            "Horizon Capital Advisors",
        );
        push(
            "insurance@demo.korbly.com",
            "Insure#2024",
            0x04,
            "Efua Boateng",
            UserRole::Insurance,
            "Meridian Life Assurance",
        );
        push(
            "dfi@demo.korbly.com",
            "Develop!2024",
            0x05,
            "Jonas Weiss",
            UserRole::Dfi,
            "Continental Development Finance",
        );
        push(
            "asset@demo.korbly.com",
            "Alloc8te!",
            0x06,
            "Nadia Hassan",
            UserRole::AssetManager,
            "Stonebridge Asset Management",
        );
        push(
            "sovereign@demo.korbly.com",
            "Reserve$2024",
            0x07,
            "Li Wen",
            UserRole::SovereignFund,
            "Meridian Sovereign Wealth Fund",
        );
        push(
            "hnwi@demo.korbly.com",
            "Private#1",
            0x08,
            "Daniel Mensah",
            UserRole::Hnwi,
            "Mensah Family Office",
        );
        push(
            "borrower@demo.korbly.com",
            "Credit&2024",
            0x09,
            "Grace Adjei",
            UserRole::InstitutionalBorrower,
            "Accra Infrastructure Holdings",
        );
        push(
            "regulator@demo.korbly.com",
            "Oversight!24",
            0x0a,
            "Samuel Ofori",
            UserRole::Regulator,
            "National Securities Commission",
        );

        Self { entries, latency }
    }
}

impl Default for DemoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for DemoDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Option<UserProfile> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        // No trimming, no case folding: near-miss credentials must fail.
        self.entries
            .iter()
            .find(|entry| entry.email == email && entry.password == password)
            .map(|entry| entry.profile.clone())
    }
}
