//! Named inventory quantity buckets.

use serde::{Deserialize, Serialize};

/// The named quantity buckets the remote platform reports per inventory
/// level.
///
/// Each bucket is optional because the platform only returns the buckets
/// that were requested and only those it tracks for the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuantityBuckets {
    pub available: Option<i64>,
    pub on_hand: Option<i64>,
    pub committed: Option<i64>,
    pub incoming: Option<i64>,
}

impl QuantityBuckets {
    /// The quantity compared against the local on-hand figure.
    ///
    /// `on_hand` when present, falling back to `available`, defaulting
    /// to 0 when the platform reports neither.
    #[must_use]
    pub const fn effective(self) -> i64 {
        match (self.on_hand, self.available) {
            (Some(on_hand), _) => on_hand,
            (None, Some(available)) => available,
            (None, None) => 0,
        }
    }

    /// Set a bucket by name.
    pub fn set(&mut self, name: BucketName, quantity: i64) {
        match name {
            BucketName::Available => self.available = Some(quantity),
            BucketName::OnHand => self.on_hand = Some(quantity),
            BucketName::Committed => self.committed = Some(quantity),
            BucketName::Incoming => self.incoming = Some(quantity),
        }
    }

    /// Build buckets from `(name, quantity)` pairs as the remote platform
    /// returns them. Unrecognized bucket names are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut buckets = Self::default();
        for (name, quantity) in pairs {
            if let Ok(name) = name.parse::<BucketName>() {
                buckets.set(name, quantity);
            }
        }
        buckets
    }
}

/// Remote bucket names this service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketName {
    Available,
    OnHand,
    Committed,
    Incoming,
}

impl std::str::FromStr for BucketName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "on_hand" => Ok(Self::OnHand),
            "committed" => Ok(Self::Committed),
            "incoming" => Ok(Self::Incoming),
            _ => Err(format!("unknown quantity bucket: {s}")),
        }
    }
}
