//! The `VectorStore` capability trait shared by the local store, the remote
//! mirror, and the adaptive facade.

pub mod rrf;

#[cfg(test)]
pub mod tests_support;

use async_trait::async_trait;

use crate::collection::Collection;
use crate::constants::HYBRID_CANDIDATE_MULTIPLIER;
use crate::document::{Document, DocType, Level, Metadata};
use crate::error::Result;

pub use rrf::RrfConfig;

/// Filter applied to `search_similar`/`search_by_text`.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub connection_id: Option<String>,
    pub doc_type: Option<DocType>,
    pub level: Option<Level>,
}

impl SearchFilter {
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.connection_id
            .as_ref()
            .is_none_or(|c| *c == doc.connection_id)
            && self.doc_type.is_none_or(|t| t == doc.doc_type)
            && self.level.is_none_or(|l| l == doc.level)
    }

    #[must_use]
    pub fn with_connection(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// Aggregate stats across all collections.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub collections: Vec<Collection>,
}

/// Capability shared by the local store, the remote mirror, and the adaptive
/// facade composing the two.
///
/// A remote mirror implements the read methods by returning empty results;
/// an adaptive facade routes reads to its local store and fans writes out to
/// both. `hybrid_search` is provided as a default method so every
/// implementation shares one fusion algorithm.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates persistent tables/collections if absent. Must be idempotent.
    async fn initialize(&self) -> Result<()>;

    async fn index_document(&self, doc: Document) -> Result<()>;

    /// Single-transaction batch upsert with the same semantics as repeated
    /// `index_document`.
    async fn batch_index(&self, docs: Vec<Document>) -> Result<()>;

    /// Upserts the document row and drops any existing embedding row for it.
    /// Used for hierarchical children, which are always unembedded.
    async fn store_without_embedding(&self, doc: Document) -> Result<()>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Missing ids yield `None` entries, preserving input order.
    async fn get_batch(&self, ids: &[String]) -> Result<Vec<Option<Document>>>;

    /// Merges `metadata` into the stored document's metadata (replacing keys
    /// present in `metadata`) and bumps `updated_at`.
    async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()>;

    /// Cascades to the document's embedding row and any children.
    async fn delete_document(&self, id: &str) -> Result<()>;

    /// Returns up to `k` documents ranked by cosine similarity to
    /// `embedding`, filtered by `filter`. Documents without an embedding are
    /// invisible. Ties break by higher `updated_at`, then lexicographic id.
    async fn search_similar(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>>;

    /// Full-text search over `content`. An empty query returns an empty
    /// result, not an error.
    async fn search_by_text(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>>;

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()>;

    async fn delete_collection(&self, name: &str) -> Result<()>;

    async fn list_collections(&self) -> Result<Vec<Collection>>;

    async fn get_stats(&self) -> Result<StoreStats>;

    async fn get_collection_stats(&self, name: &str) -> Result<Option<Collection>>;

    /// Implementation-defined maintenance (e.g. index rebuild).
    async fn optimize(&self) -> Result<()>;

    /// Snapshot semantics; the store must be quiescent during the call.
    async fn backup(&self, path: &str) -> Result<()>;

    async fn restore(&self, path: &str) -> Result<()>;

    /// Fans `search_similar(embedding, 3k)` and `search_by_text(query, 3k)`
    /// out concurrently and fuses the results with RRF. If the
    /// text search fails, fusion degrades to the vector list alone and the
    /// error is logged rather than propagated.
    async fn hybrid_search(
        &self,
        query: &str,
        embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
        rrf_config: &RrfConfig,
    ) -> Result<Vec<Document>> {
        let wide_k = k * HYBRID_CANDIDATE_MULTIPLIER;

        let (vector_result, text_result) = tokio::join!(
            self.search_similar(embedding, wide_k, filter),
            self.search_by_text(query, wide_k, filter)
        );

        let vector_docs = vector_result?;
        let text_docs = match text_result {
            Ok(docs) => Some(docs),
            Err(e) => {
                tracing::warn!(error = %e, "text search failed inside hybrid_search, degrading to vector-only");
                None
            }
        };

        Ok(rrf::fuse(vector_docs, text_docs, k, rrf_config))
    }
}

/// Ordering helper used by concrete stores implementing `search_similar`:
/// higher cosine score first, then higher `updated_at`, then lower id.
#[must_use]
pub fn rank_candidates(mut candidates: Vec<(Document, f32)>) -> Vec<Document> {
    candidates.sort_by(|(doc_a, score_a), (doc_b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| doc_b.updated_at.cmp(&doc_a.updated_at))
            .then_with(|| doc_a.id.cmp(&doc_b.id))
    });
    candidates
        .into_iter()
        .map(|(mut doc, score)| {
            doc.score = Some(score);
            doc
        })
        .collect()
}

/// Cosine similarity between two equal-length vectors, in `[-1, 1]`.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn search_filter_matches_on_all_present_fields() {
        let doc = Document::new("x", "conn-1", DocType::Schema, Level::Table, "x");
        let filter = SearchFilter::default()
            .with_connection("conn-1")
            .with_type(DocType::Schema)
            .with_level(Level::Table);
        assert!(filter.matches(&doc));

        let filter = SearchFilter::default().with_connection("conn-2");
        assert!(!filter.matches(&doc));
    }
}
