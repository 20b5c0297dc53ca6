//! Logical namespace for stats and dimension enforcement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_COLLECTIONS;

/// Distance metric a collection was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Cosine,
    Euclidean,
}

/// A logical namespace (`schemas`, `queries`, `performance`, `business`, `memory`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub vector_size: usize,
    pub distance: Distance,
    pub document_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>, vector_size: usize) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            vector_size,
            distance: Distance::Cosine,
            document_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The five default collections seeded at `initialize()`, all at `vector_size`.
    #[must_use]
    pub fn defaults(vector_size: usize) -> Vec<Self> {
        DEFAULT_COLLECTIONS
            .iter()
            .map(|name| Self::new(*name, vector_size))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_five_named_collections() {
        let cols = Collection::defaults(384);
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["schemas", "queries", "performance", "business", "memory"]
        );
        assert!(cols.iter().all(|c| c.vector_size == 384));
    }
}
