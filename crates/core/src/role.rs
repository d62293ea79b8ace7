//! The role registry: the closed set of institutional user categories.
//!
//! Roles are the sole authorization key in the portal. The set is closed on
//! purpose: adding a variant forces every permission site (the matrix, the
//! route tables) to be revisited at compile time via exhaustive matches.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Institutional user role.
///
/// No hierarchy or inheritance is modeled between roles; each role's
/// permissions are listed explicitly even where two roles coincide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    PensionFund,
    Insurance,
    Dfi,
    AssetManager,
    SovereignFund,
    Hnwi,
    InstitutionalBorrower,
    Admin,
    Regulator,
}

impl UserRole {
    /// Every role in the registry, in declaration order.
    pub const ALL: [UserRole; 9] = [
        UserRole::PensionFund,
        UserRole::Insurance,
        UserRole::Dfi,
        UserRole::AssetManager,
        UserRole::SovereignFund,
        UserRole::Hnwi,
        UserRole::InstitutionalBorrower,
        UserRole::Admin,
        UserRole::Regulator,
    ];

    /// Canonical wire/URL form of the role (also the serde form).
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::PensionFund => "pension_fund",
            UserRole::Insurance => "insurance",
            UserRole::Dfi => "dfi",
            UserRole::AssetManager => "asset_manager",
            UserRole::SovereignFund => "sovereign_fund",
            UserRole::Hnwi => "hnwi",
            UserRole::InstitutionalBorrower => "institutional_borrower",
            UserRole::Admin => "admin",
            UserRole::Regulator => "regulator",
        }
    }
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    /// Strict parse: exact canonical form only, no trimming or case folding.
    ///
    /// Unrecognized strings are how "unknown role" enters the deny-by-default
    /// paths, so this must not be lenient.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::unknown_role(s))
    }
}
