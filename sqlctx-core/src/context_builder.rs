//! Orchestrates retrieval under budget and assembles the final context.

use std::sync::Arc;

use serde::Serialize;

use crate::budget::{estimate_tokens, truncate_to_budget, Category, TokenBudgetAllocator};
use crate::constants::{
    BUSINESS_CANDIDATES, EXAMPLES_CANDIDATES, MIN_TRUNCATED_ENTRY_TOKENS, PERFORMANCE_CANDIDATES,
    SCHEMA_CANDIDATES,
};
use crate::document::{Document, DocType, Value};
use crate::embeddings::EmbeddingService;
use crate::error::Result;
use crate::hierarchical::{HierarchicalRetriever, SchemaContext};
use crate::pattern_matcher::{NoopPatternMatcher, PatternMatcher, QueryPattern};
use crate::stats_enricher::{NoopStatsEnricher, StatsEnricher};
use crate::store::{SearchFilter, VectorStore};

/// A business rule retrieved for the current query, with an applicability
/// verdict computed against the query string.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessRule {
    pub rule: String,
    pub applicable: bool,
    pub relevance_score: f32,
}

/// One of three heuristic performance hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HintKind {
    MissingIndex,
    QueryRewrite,
    Partitioning,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationHint {
    pub kind: HintKind,
    pub message: String,
}

/// The final assembled context handed to the downstream prompt formatter.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AssembledContext {
    pub schema: Vec<SchemaContext>,
    pub examples: Vec<QueryPattern>,
    pub business: Vec<BusinessRule>,
    pub performance: Vec<OptimizationHint>,
}

/// Bundle returned by `build_with_budget`.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub context: AssembledContext,
    pub allocation: crate::budget::BudgetAllocation,
    pub confidence: f32,
}

/// Orchestrates the Context Builder's four-category retrieval under a fixed
/// token budget. Generic over the `VectorStore` it is constructed with —
/// normally the adaptive store, so hierarchical retrieval and category
/// filters transparently benefit from local-first reads.
pub struct ContextBuilder<S: VectorStore> {
    store: Arc<S>,
    embeddings: Arc<EmbeddingService>,
    pattern_matcher: Box<dyn PatternMatcher>,
    stats_enricher: Box<dyn StatsEnricher>,
}

impl<S: VectorStore> ContextBuilder<S> {
    #[must_use]
    pub fn new(store: Arc<S>, embeddings: Arc<EmbeddingService>) -> Self {
        Self {
            store,
            embeddings,
            pattern_matcher: Box::new(NoopPatternMatcher),
            stats_enricher: Box::new(NoopStatsEnricher),
        }
    }

    #[must_use]
    pub fn with_pattern_matcher(mut self, matcher: Box<dyn PatternMatcher>) -> Self {
        self.pattern_matcher = matcher;
        self
    }

    #[must_use]
    pub fn with_stats_enricher(mut self, enricher: Box<dyn StatsEnricher>) -> Self {
        self.stats_enricher = enricher;
        self
    }

    /// Performs the five-step build contract: allocate, embed, retrieve per
    /// category, score confidence. Embedding
    /// failure is fatal and surfaces as `Err`; any other category failure
    /// is logged and yields an empty section, never aborting the overall
    /// assembly.
    pub async fn build_with_budget(
        &self,
        query: &str,
        connection_id: &str,
        total_budget: u64,
        has_error: bool,
    ) -> Result<BuildOutput> {
        let mut allocation = TokenBudgetAllocator::allocate(total_budget, query, has_error);
        let embedding = self.embeddings.embed(query).await?;

        let mut context = AssembledContext::default();

        if allocation.schema > 0 {
            let (schema, used) = self.build_schema(query, &embedding, connection_id, allocation.schema).await;
            context.schema = schema;
            TokenBudgetAllocator::adjust_for_actual_usage(&mut allocation, Category::Schema, used);
        }

        if allocation.examples > 0 {
            let (examples, used) = self
                .build_examples(query, &embedding, connection_id, allocation.examples)
                .await;
            context.examples = examples;
            TokenBudgetAllocator::adjust_for_actual_usage(&mut allocation, Category::Examples, used);
        }

        if allocation.business > 0 {
            let (business, used) = self.build_business(query, &embedding, allocation.business).await;
            context.business = business;
            TokenBudgetAllocator::adjust_for_actual_usage(&mut allocation, Category::Business, used);
        }

        if allocation.performance > 0 {
            let (performance, used) = self
                .build_performance(query, &embedding, connection_id, allocation.performance)
                .await;
            context.performance = performance;
            TokenBudgetAllocator::adjust_for_actual_usage(&mut allocation, Category::Performance, used);
        }

        let confidence = confidence_score(&context);

        Ok(BuildOutput {
            context,
            allocation,
            confidence,
        })
    }

    async fn build_schema(
        &self,
        _query: &str,
        embedding: &[f32],
        connection_id: &str,
        budget: u64,
    ) -> (Vec<SchemaContext>, u64) {
        let retriever = HierarchicalRetriever::new(self.store.clone());
        let candidates = match retriever
            .fetch_schemas_hierarchical(embedding, connection_id, SCHEMA_CANDIDATES)
            .await
        {
            Ok(contexts) => contexts,
            Err(e) => {
                tracing::warn!(error = %e, "hierarchical schema retrieval failed, returning empty schema section");
                return (Vec::new(), 0);
            }
        };

        let mut packed = Vec::new();
        let mut used = 0u64;
        for mut ctx in candidates {
            ctx = self.stats_enricher.enrich(ctx);
            let tokens = estimate_tokens(&ctx.description);
            if used + tokens <= budget {
                used += tokens;
                packed.push(ctx);
            } else {
                let remaining = budget.saturating_sub(used);
                if remaining >= MIN_TRUNCATED_ENTRY_TOKENS {
                    ctx.description = truncate_to_budget(&ctx.description, remaining);
                    used += estimate_tokens(&ctx.description);
                    packed.push(ctx);
                }
                break;
            }
        }
        (packed, used)
    }

    async fn build_examples(
        &self,
        query: &str,
        embedding: &[f32],
        connection_id: &str,
        budget: u64,
    ) -> (Vec<QueryPattern>, u64) {
        let filter = SearchFilter::default()
            .with_connection(connection_id)
            .with_type(DocType::Query);
        let docs = match self
            .store
            .hybrid_search(query, embedding, EXAMPLES_CANDIDATES, &filter, &Default::default())
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(error = %e, "examples retrieval failed, returning empty section");
                return (Vec::new(), 0);
            }
        };

        let patterns = self.pattern_matcher.extract(&docs);
        let mut packed = Vec::new();
        let mut used = 0u64;
        for pattern in patterns {
            let tokens = estimate_tokens(&pattern.pattern);
            if used + tokens > budget {
                break;
            }
            used += tokens;
            packed.push(pattern);
        }
        (packed, used)
    }

    async fn build_business(&self, query: &str, embedding: &[f32], budget: u64) -> (Vec<BusinessRule>, u64) {
        let filter = SearchFilter::default().with_type(DocType::Business);
        let docs = match self
            .store
            .hybrid_search(query, embedding, BUSINESS_CANDIDATES, &filter, &Default::default())
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(error = %e, "business rule retrieval failed, returning empty section");
                return (Vec::new(), 0);
            }
        };

        let mut packed = Vec::new();
        let mut used = 0u64;
        for doc in docs {
            let rule = BusinessRule {
                applicable: rule_applies(&doc.content, query),
                relevance_score: doc.score.unwrap_or(0.0),
                rule: doc.content,
            };
            let tokens = estimate_tokens(&rule.rule);
            if used + tokens > budget {
                break;
            }
            used += tokens;
            packed.push(rule);
        }
        (packed, used)
    }

    async fn build_performance(
        &self,
        query: &str,
        embedding: &[f32],
        connection_id: &str,
        budget: u64,
    ) -> (Vec<OptimizationHint>, u64) {
        let filter = SearchFilter::default()
            .with_connection(connection_id)
            .with_type(DocType::Performance);
        let docs = match self
            .store
            .hybrid_search(query, embedding, PERFORMANCE_CANDIDATES, &filter, &Default::default())
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(error = %e, "performance retrieval failed, returning empty section");
                return (Vec::new(), 0);
            }
        };

        let hints: Vec<OptimizationHint> = [
            missing_index_heuristic(query, &docs),
            query_rewrite_heuristic(query, &docs),
            partitioning_heuristic(&docs),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut packed = Vec::new();
        let mut used = 0u64;
        for hint in hints {
            let tokens = estimate_tokens(&hint.message);
            if used + tokens > budget {
                continue;
            }
            used += tokens;
            packed.push(hint);
        }
        (packed, used)
    }
}

/// A rule "applies" if it shares a distinguishing (length > 3) word with the
/// query, or carries no distinguishing words at all (a general rule).
fn rule_applies(rule_content: &str, query: &str) -> bool {
    let query_words: std::collections::HashSet<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 3)
        .collect();
    let rule_words: Vec<String> = rule_content
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 3)
        .collect();

    if rule_words.is_empty() {
        return true;
    }
    rule_words.iter().any(|w| query_words.contains(w))
}

fn missing_index_heuristic(query: &str, docs: &[Document]) -> Option<OptimizationHint> {
    let query_lower = query.to_lowercase();
    let mentions_filter = query_lower.contains("where") || query_lower.contains("join");
    let already_indexed = docs
        .iter()
        .any(|d| d.content.to_lowercase().contains("index"));
    if mentions_filter && !already_indexed {
        Some(OptimizationHint {
            kind: HintKind::MissingIndex,
            message: "query filters or joins on columns with no known covering index".to_string(),
        })
    } else {
        None
    }
}

fn query_rewrite_heuristic(query: &str, _docs: &[Document]) -> Option<OptimizationHint> {
    let query_lower = query.to_lowercase();
    if query_lower.contains("select *") {
        Some(OptimizationHint {
            kind: HintKind::QueryRewrite,
            message: "selecting all columns; consider projecting only the columns in use".to_string(),
        })
    } else {
        None
    }
}

fn partitioning_heuristic(docs: &[Document]) -> Option<OptimizationHint> {
    const LARGE_TABLE_ROWS: i64 = 10_000_000;
    docs.iter()
        .find_map(|d| d.metadata.get("row_count").and_then(Value::as_i64))
        .filter(|&rows| rows > LARGE_TABLE_ROWS)
        .map(|_| OptimizationHint {
            kind: HintKind::Partitioning,
            message: "table exceeds 10M rows; consider partitioning by a high-cardinality column"
                .to_string(),
        })
}

/// Fixed weighted function of per-category counts, capped at 1.0.
fn confidence_score(context: &AssembledContext) -> f32 {
    fn weight(count: usize) -> f32 {
        (count.min(3) as f32) / 3.0
    }
    0.4 * weight(context.schema.len())
        + 0.3 * weight(context.examples.len())
        + 0.2 * weight(context.business.len())
        + 0.1 * weight(context.performance.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::document::{DocType, Level};
    use crate::embeddings::{EmbeddingCache, OfflineProjector};
    use crate::store::tests_support::InMemoryStore;

    async fn make_builder() -> (ContextBuilder<InMemoryStore>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        store.initialize().await.unwrap();
        let cache_cfg = CacheConfig::default();
        let embeddings = Arc::new(EmbeddingService::new(
            Box::new(OfflineProjector::new(32)),
            EmbeddingCache::new(cache_cfg.max_size, cache_cfg.ttl),
        ));
        (ContextBuilder::new(store.clone(), embeddings), store)
    }

    #[tokio::test]
    async fn empty_store_yields_empty_but_successful_context() {
        let (builder, _store) = make_builder().await;
        let output = builder
            .build_with_budget("show me recent orders", "conn-1", 4000, false)
            .await
            .unwrap();
        assert!(output.context.schema.is_empty());
        assert_eq!(output.confidence, 0.0);
    }

    /// S6: forcing `search_by_text` to fail degrades hybrid search to the
    /// vector list, which the builder surfaces without erroring.
    #[tokio::test]
    async fn category_retrieval_never_aborts_overall_build() {
        let (builder, store) = make_builder().await;
        let doc = Document::new("biz:1", "conn-1", DocType::Business, Level::None, "never share PII")
            .with_embedding(vec![0.1; 32]);
        store.index_document(doc).await.unwrap();

        let output = builder
            .build_with_budget("can I export customer emails", "conn-1", 4000, false)
            .await
            .unwrap();
        assert!(output.allocation.total() <= 4000);
    }
}
