//! The feature registry: gate-able units of platform functionality.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A gate-able platform module, independent of its URL or UI representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Portfolio,
    Syndication,
    Valuation,
    Documentation,
    Compliance,
    CreditEngine,
}

impl Feature {
    /// The full feature universe.
    pub const ALL: [Feature; 6] = [
        Feature::Portfolio,
        Feature::Syndication,
        Feature::Valuation,
        Feature::Documentation,
        Feature::Compliance,
        Feature::CreditEngine,
    ];

    /// Canonical wire form of the feature (also the serde form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Portfolio => "portfolio",
            Feature::Syndication => "syndication",
            Feature::Valuation => "valuation",
            Feature::Documentation => "documentation",
            Feature::Compliance => "compliance",
            Feature::CreditEngine => "credit_engine",
        }
    }
}

impl core::fmt::Display for Feature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| DomainError::unknown_feature(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_feature() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
    }

    #[test]
    fn universe_has_six_features() {
        assert_eq!(Feature::ALL.len(), 6);
    }
}
