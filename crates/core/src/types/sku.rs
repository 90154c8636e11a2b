//! Validated SKU newtype.
//!
//! The SKU is the immutable business key tying a local product to its
//! counterparts in the remote storefronts. It is stored verbatim; remote
//! matches are compared case-insensitively via [`Sku::matches`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from SKU validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkuError {
    /// The SKU was empty or whitespace-only.
    #[error("SKU must not be empty")]
    Empty,
}

/// A stock-keeping unit.
///
/// Guaranteed non-empty and free of leading/trailing whitespace. The
/// original casing is preserved because the remote platform stores SKUs
/// verbatim; comparisons against remote variants use [`Sku::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Create a SKU from a raw string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `SkuError::Empty` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, SkuError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SkuError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a remote SKU string.
    ///
    /// The remote search endpoint is not guaranteed to return an exact
    /// match, so resolved variants are re-verified with this check.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_trims_whitespace() {
        let sku = Sku::new("  SS-NOG  ").unwrap();
        assert_eq!(sku.as_str(), "SS-NOG");
    }

    #[test]
    fn test_sku_rejects_empty() {
        assert_eq!(Sku::new("").unwrap_err(), SkuError::Empty);
        assert_eq!(Sku::new("   ").unwrap_err(), SkuError::Empty);
    }

    #[test]
    fn test_sku_preserves_case() {
        let sku = Sku::new("ss-Nog").unwrap();
        assert_eq!(sku.as_str(), "ss-Nog");
    }

    #[test]
    fn test_sku_matches_is_case_insensitive() {
        let sku = Sku::new("SS-NOG").unwrap();
        assert!(sku.matches("ss-nog"));
        assert!(sku.matches(" SS-NOG "));
        assert!(!sku.matches("SS-NOG-2"));
    }

    #[test]
    fn test_sku_serde_is_transparent() {
        let sku = Sku::new("SS-NOG").unwrap();
        let json = serde_json::to_string(&sku).unwrap();
        assert_eq!(json, "\"SS-NOG\"");

        let back: Sku = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sku);
    }
}
