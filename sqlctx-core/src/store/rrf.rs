//! Reciprocal Rank Fusion.

use std::collections::HashMap;

use crate::document::{Document, Value};

/// RRF tuning: the constant K and per-list weights.
#[derive(Debug, Clone, Copy)]
pub struct RrfConfig {
    pub k: u32,
    pub vector_weight: f64,
    pub text_weight: f64,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self {
            k: crate::constants::DEFAULT_RRF_CONSTANT,
            vector_weight: crate::constants::DEFAULT_LIST_WEIGHT,
            text_weight: crate::constants::DEFAULT_LIST_WEIGHT,
        }
    }
}

struct Fused {
    doc: Document,
    vector_rank: Option<usize>,
    text_rank: Option<usize>,
    score: f64,
}

/// Fuses a vector-search result list with an optional text-search result
/// list (`None` when `search_by_text` failed and fusion degraded to the
/// vector list alone), returning the top `k` documents by fused score.
///
/// Each returned document carries `metadata.vector_rank`, `metadata.text_rank`
/// (or `Null` if absent from that list), and `metadata.rrf_score`. Ties break
/// by better (lower) vector rank, then lexicographic id.
#[must_use]
pub fn fuse(
    vector_results: Vec<Document>,
    text_results: Option<Vec<Document>>,
    k: usize,
    config: &RrfConfig,
) -> Vec<Document> {
    let mut fused: HashMap<String, Fused> = HashMap::new();

    for (rank, doc) in vector_results.into_iter().enumerate() {
        let contribution = config.vector_weight / (rank as f64 + 1.0 + f64::from(config.k));
        fused
            .entry(doc.id.clone())
            .and_modify(|f| f.score += contribution)
            .or_insert_with(|| Fused {
                doc: doc.clone(),
                vector_rank: Some(rank),
                text_rank: None,
                score: contribution,
            })
            .vector_rank
            .get_or_insert(rank);
    }

    if let Some(text_results) = text_results {
        for (rank, doc) in text_results.into_iter().enumerate() {
            let contribution = config.text_weight / (rank as f64 + 1.0 + f64::from(config.k));
            match fused.get_mut(&doc.id) {
                Some(entry) => {
                    entry.score += contribution;
                    entry.text_rank.get_or_insert(rank);
                }
                None => {
                    fused.insert(
                        doc.id.clone(),
                        Fused {
                            doc,
                            vector_rank: None,
                            text_rank: Some(rank),
                            score: contribution,
                        },
                    );
                }
            }
        }
    }

    let mut entries: Vec<Fused> = fused.into_values().collect();
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.vector_rank
                    .unwrap_or(usize::MAX)
                    .cmp(&b.vector_rank.unwrap_or(usize::MAX))
            })
            .then_with(|| a.doc.id.cmp(&b.doc.id))
    });

    entries
        .into_iter()
        .take(k)
        .map(|f| {
            let mut doc = f.doc;
            doc.metadata.insert(
                "vector_rank".to_string(),
                f.vector_rank.map_or(Value::Null, |r| Value::Int(r as i64)),
            );
            doc.metadata.insert(
                "text_rank".to_string(),
                f.text_rank.map_or(Value::Null, |r| Value::Int(r as i64)),
            );
            doc.metadata
                .insert("rrf_score".to_string(), Value::Float(f.score));
            doc.score = Some(f.score as f32);
            doc
        })
        .collect()
}
