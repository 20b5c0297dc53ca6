//! Query-pattern extraction, declared as an extension point.
//!
//! `NoopPatternMatcher` always returns no patterns. It exists so the
//! Context Builder has a stable seam to call through if a caller ever
//! wants to supply a real implementation.

use serde::Serialize;

use crate::document::Document;

/// An extracted usage pattern from a historical query document.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPattern {
    pub pattern: String,
    pub frequency: u64,
    pub avg_duration_ms: Option<f64>,
}

/// Extracts patterns from a set of `DocType::Query` documents.
pub trait PatternMatcher: Send + Sync {
    fn extract(&self, documents: &[Document]) -> Vec<QueryPattern>;
}

/// The declared-but-unimplemented default: always returns no patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPatternMatcher;

impl PatternMatcher for NoopPatternMatcher {
    fn extract(&self, _documents: &[Document]) -> Vec<QueryPattern> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocType, Level};

    #[test]
    fn noop_matcher_returns_nothing() {
        let docs = vec![Document::new("q:1", "c1", DocType::Query, Level::None, "select 1")];
        assert!(NoopPatternMatcher.extract(&docs).is_empty());
    }
}
