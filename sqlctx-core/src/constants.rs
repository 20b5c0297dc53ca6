//! Default values used throughout the retrieval core, collected so they're defined once.

use std::time::Duration;

/// Default RRF rank-fusion constant.
pub const DEFAULT_RRF_CONSTANT: u32 = 60;
/// Default per-list weight in RRF fusion.
pub const DEFAULT_LIST_WEIGHT: f64 = 1.0;

/// Candidate multiplier: `hybrid_search(.., k)` asks each sub-search for `3k`.
pub const HYBRID_CANDIDATE_MULTIPLIER: usize = 3;

/// Adaptive store defaults.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Hierarchical retrieval: parents ranked beyond this get summary-only treatment.
pub const HIERARCHICAL_EXPAND_TOP_N: usize = 3;

/// Budget allocator baseline weights.
pub const WEIGHT_SCHEMA: f64 = 0.4;
pub const WEIGHT_EXAMPLES: f64 = 0.3;
pub const WEIGHT_BUSINESS: f64 = 0.2;
pub const WEIGHT_PERFORMANCE: f64 = 0.1;

/// Context builder candidate counts.
pub const SCHEMA_CANDIDATES: usize = 20;
pub const EXAMPLES_CANDIDATES: usize = 30;
pub const BUSINESS_CANDIDATES: usize = 15;
pub const PERFORMANCE_CANDIDATES: usize = 10;

/// Minimum remaining budget to admit a truncated final schema entry.
pub const MIN_TRUNCATED_ENTRY_TOKENS: u64 = 100;

/// Default embedding cache size and TTL.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 10_000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default external call timeouts.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Token estimation: characters assumed per token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Names of the five default collections seeded at `initialize()`.
pub const DEFAULT_COLLECTIONS: [&str; 5] =
    ["schemas", "queries", "performance", "business", "memory"];
