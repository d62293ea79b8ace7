//! The permission matrix: static role → feature-set mapping.

use korbly_core::{Feature, UserRole};

/// Features a role may use.
///
/// Pure function over a static table. Every role is listed explicitly — even
/// where two roles share an identical set — so the match stays exhaustive and
/// a new role variant fails compilation until a row is added here.
pub fn permitted_features(role: UserRole) -> &'static [Feature] {
    match role {
        UserRole::Admin => &Feature::ALL,
        UserRole::Dfi => &Feature::ALL,
        UserRole::PensionFund => &[
            Feature::Portfolio,
            Feature::Syndication,
            Feature::Valuation,
            Feature::Documentation,
            Feature::Compliance,
        ],
        UserRole::Insurance => &[
            Feature::Portfolio,
            Feature::Syndication,
            Feature::Valuation,
            Feature::Documentation,
            Feature::Compliance,
        ],
        UserRole::AssetManager => &[
            Feature::Portfolio,
            Feature::Syndication,
            Feature::Valuation,
            Feature::Documentation,
            Feature::Compliance,
        ],
        UserRole::SovereignFund => &[
            Feature::Portfolio,
            Feature::Syndication,
            Feature::Valuation,
            Feature::Documentation,
            Feature::Compliance,
        ],
        UserRole::Hnwi => &[Feature::Portfolio, Feature::Documentation],
        UserRole::InstitutionalBorrower => &[Feature::CreditEngine, Feature::Documentation],
        UserRole::Regulator => &[Feature::Compliance, Feature::Documentation],
    }
}
