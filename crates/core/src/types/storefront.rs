//! Storefront identifiers.

use serde::{Deserialize, Serialize};

/// One of the two remote storefronts inventory is reconciled against.
///
/// The service targets exactly two store connections with a fixed mapping;
/// this is deliberately an enum rather than an open string so the compiler
/// enforces that every fan-out covers both stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Storefront {
    /// The primary storefront (`SHOPIFY_STORE_ONE_*` configuration).
    StoreOne,
    /// The secondary storefront (`SHOPIFY_STORE_TWO_*` configuration).
    StoreTwo,
}

impl Storefront {
    /// Both storefronts, in sync fan-out order.
    pub const ALL: [Self; 2] = [Self::StoreOne, Self::StoreTwo];

    /// Stable identifier used in API responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoreOne => "store-one",
            Self::StoreTwo => "store-two",
        }
    }
}

impl std::fmt::Display for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Storefront {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store-one" => Ok(Self::StoreOne),
            "store-two" => Ok(Self::StoreTwo),
            _ => Err(format!("invalid storefront: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_both_stores() {
        assert_eq!(Storefront::ALL.len(), 2);
        assert_ne!(Storefront::ALL[0], Storefront::ALL[1]);
    }

    #[test]
    fn test_round_trip_from_str() {
        for store in Storefront::ALL {
            let parsed: Storefront = store.as_str().parse().unwrap();
            assert_eq!(parsed, store);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("store-three".parse::<Storefront>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Storefront::StoreOne).unwrap();
        assert_eq!(json, "\"store-one\"");
    }
}
