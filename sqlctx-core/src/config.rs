//! Configuration surface, enumerated exhaustively, no file-loading.
//!
//! Callers construct these directly, or via `toml::from_str`/`serde_json`;
//! env-var precedence and file watching are out of scope here, same as the
//! teacher leaves its own `TursoConfig` file-loading to an external binary.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL, DEFAULT_MAX_RETRIES, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RRF_CONSTANT,
};

/// Which embedding provider backs the `EmbeddingService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    Http,
    Offline,
}

impl Default for EmbeddingProviderKind {
    fn default() -> Self {
        Self::Offline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_size: usize,
    #[serde(with = "humantime_secs")]
    pub ttl: std::time::Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub endpoint: String,
    pub model: String,
    pub dimension: usize,
    pub auto_pull: bool,
    pub cache: CacheConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Offline,
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimension: 384,
            auto_pull: false,
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub path: String,
    pub vector_size: usize,
    pub cache_size_mb: usize,
    pub mmap_size_mb: usize,
    pub wal_enabled: bool,
    #[serde(with = "humantime_secs")]
    pub timeout: std::time::Duration,
    pub rrf_constant: u32,
    pub vector_weight: f64,
    pub text_weight: f64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            path: "sqlctx.db".to_string(),
            vector_size: 384,
            cache_size_mb: 64,
            mmap_size_mb: 256,
            wal_enabled: true,
            timeout: std::time::Duration::from_secs(30),
            rrf_constant: DEFAULT_RRF_CONSTANT,
            vector_weight: 1.0,
            text_weight: 1.0,
        }
    }
}

/// Deployment tier, gating whether adaptive replication is attempted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Individual,
    Team,
    Enterprise,
}

impl Default for Tier {
    fn default() -> Self {
        Self::Individual
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub tier: Tier,
    pub sync_enabled: bool,
    pub max_retries: u32,
    pub queue_capacity: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Individual,
            sync_enabled: true,
            max_retries: DEFAULT_MAX_RETRIES,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl AdaptiveConfig {
    /// Whether writes should be enqueued for replication at all.
    #[must_use]
    pub fn replicates(&self) -> bool {
        self.sync_enabled && matches!(self.tier, Tier::Individual | Tier::Team)
    }
}

mod humantime_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_tier_gates_replication() {
        let mut cfg = AdaptiveConfig::default();
        assert!(cfg.replicates());
        cfg.tier = Tier::Enterprise;
        assert!(!cfg.replicates());
        cfg.tier = Tier::Team;
        cfg.sync_enabled = false;
        assert!(!cfg.replicates());
    }

    #[test]
    fn deserializes_from_toml() {
        let toml = r#"
            provider = "http"
            endpoint = "http://example.local"
            model = "m"
            dimension = 768
            auto_pull = true
        "#;
        let cfg: EmbeddingConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.dimension, 768);
        assert_eq!(cfg.provider, EmbeddingProviderKind::Http);
    }
}
