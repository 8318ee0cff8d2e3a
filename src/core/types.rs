// Edit-LSH: Shared Identifier Types

use serde::{Deserialize, Serialize};

/// Stable position of an item in the corpus.
pub type ItemId = usize;

/// Unordered pair of distinct corpus items, stored as `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidatePair {
    first: ItemId,
    second: ItemId,
}

impl CandidatePair {
    /// Canonical pair for `a` and `b`, `None` when they are the same item.
    pub fn new(a: ItemId, b: ItemId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> ItemId {
        self.first
    }

    pub fn second(&self) -> ItemId {
        self.second
    }

    pub fn as_tuple(&self) -> (ItemId, ItemId) {
        (self.first, self.second)
    }
}

impl std::fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}
