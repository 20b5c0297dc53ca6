//! Parent-only search then on-demand child expansion.

use std::sync::Arc;

use serde::Serialize;

use crate::constants::HIERARCHICAL_EXPAND_TOP_N;
use crate::document::{Document, Level, Value};
use crate::error::Result;
use crate::store::{SearchFilter, VectorStore};

/// A reconstructed column, built from a child document's metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: Option<String>,
    pub is_primary: bool,
    pub nullable: bool,
}

/// A reconstructed index, built from a child document's metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// A reconstructed relationship, built from a child document's metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipInfo {
    pub referenced_table: Option<String>,
    pub referenced_columns: Vec<String>,
}

/// Assembled view of one table, with child detail expanded only for the
/// top-ranked parents.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaContext {
    pub table: String,
    pub description: String,
    pub row_count: Option<i64>,
    pub relevance_score: f32,
    pub columns: Option<Vec<ColumnInfo>>,
    pub indexes: Option<Vec<IndexInfo>>,
    pub relationships: Option<Vec<RelationshipInfo>>,
}

impl SchemaContext {
    fn summary_only(parent: &Document) -> Self {
        Self {
            table: parent
                .metadata
                .get("table")
                .and_then(Value::as_str)
                .unwrap_or(&parent.id)
                .to_string(),
            description: parent.content.clone(),
            row_count: parent.metadata.get("row_count").and_then(Value::as_i64),
            relevance_score: parent.score.unwrap_or(0.0),
            columns: None,
            indexes: None,
            relationships: None,
        }
    }
}

fn classify_child(child: &Document) -> ChildKind {
    if child.metadata.contains_key("data_type") || child.metadata.contains_key("column") {
        ChildKind::Column
    } else if child.metadata.contains_key("referenced_table") {
        ChildKind::Relationship
    } else {
        ChildKind::Index
    }
}

enum ChildKind {
    Column,
    Index,
    Relationship,
}

fn column_info(child: &Document) -> ColumnInfo {
    ColumnInfo {
        name: child
            .metadata
            .get("column")
            .and_then(Value::as_str)
            .unwrap_or(&child.id)
            .to_string(),
        data_type: child
            .metadata
            .get("data_type")
            .and_then(Value::as_str)
            .map(str::to_string),
        is_primary: child
            .metadata
            .get("is_primary")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        nullable: child
            .metadata
            .get("nullable")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    }
}

fn index_info(child: &Document) -> IndexInfo {
    IndexInfo {
        name: child.id.clone(),
        columns: child
            .metadata
            .get("columns")
            .and_then(Value::as_id_list)
            .unwrap_or_default(),
        is_unique: child
            .metadata
            .get("is_unique")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn relationship_info(child: &Document) -> RelationshipInfo {
    RelationshipInfo {
        referenced_table: child
            .metadata
            .get("referenced_table")
            .and_then(Value::as_str)
            .map(str::to_string),
        referenced_columns: child
            .metadata
            .get("referenced_columns")
            .and_then(Value::as_id_list)
            .unwrap_or_default(),
    }
}

/// Wraps any `VectorStore` (so it composes transparently with the adaptive
/// store) and implements the retrieval contract.
pub struct HierarchicalRetriever<S: VectorStore> {
    store: Arc<S>,
}

impl<S: VectorStore> HierarchicalRetriever<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Implements the four-step contract: parent-only search, then expand
    /// the top 3 parents' children; parents ranked 4..limit get a
    /// summary-only view; malformed `child_ids` fall back to summary-only
    /// with a warning.
    pub async fn fetch_schemas_hierarchical(
        &self,
        embedding: &[f32],
        connection_id: &str,
        limit: usize,
    ) -> Result<Vec<SchemaContext>> {
        let filter = SearchFilter::default()
            .with_connection(connection_id)
            .with_level(Level::Table);
        let parents = self.store.search_similar(embedding, limit, &filter).await?;

        let mut contexts = Vec::with_capacity(parents.len());
        for (rank, parent) in parents.into_iter().enumerate() {
            if rank < HIERARCHICAL_EXPAND_TOP_N {
                contexts.push(self.expand_parent(parent).await?);
            } else {
                contexts.push(SchemaContext::summary_only(&parent));
            }
        }
        Ok(contexts)
    }

    async fn expand_parent(&self, parent: Document) -> Result<SchemaContext> {
        let Some(child_ids) = parent.child_ids() else {
            if parent.metadata.contains_key("child_ids") {
                tracing::warn!(
                    table = %parent.id,
                    "parent has malformed child_ids metadata, falling back to summary-only view"
                );
            }
            return Ok(SchemaContext::summary_only(&parent));
        };

        if child_ids.is_empty() {
            return Ok(SchemaContext::summary_only(&parent));
        }

        let children = match self.store.get_batch(&child_ids).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(table = %parent.id, error = %e, "child batch fetch failed, degrading to summary");
                return Ok(SchemaContext::summary_only(&parent));
            }
        };

        let mut columns = Vec::new();
        let mut indexes = Vec::new();
        let mut relationships = Vec::new();
        for child in children.into_iter().flatten() {
            match classify_child(&child) {
                ChildKind::Column => columns.push(column_info(&child)),
                ChildKind::Index => indexes.push(index_info(&child)),
                ChildKind::Relationship => relationships.push(relationship_info(&child)),
            }
        }

        let mut ctx = SchemaContext::summary_only(&parent);
        ctx.columns = Some(columns);
        ctx.indexes = Some(indexes);
        ctx.relationships = Some(relationships);
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocType;
    use crate::store::tests_support::InMemoryStore;

    fn table_doc(id: &str, conn: &str, child_ids: Vec<&str>) -> Document {
        Document::new(id, conn, DocType::Schema, Level::Table, "a table")
            .with_embedding(vec![1.0, 0.0])
            .with_metadata("table", id)
            .with_metadata("child_ids", Value::list_of_strings(child_ids))
    }

    fn column_doc(id: &str, parent: &str, conn: &str, name: &str) -> Document {
        Document::new(id, conn, DocType::Schema, Level::Column, name)
            .with_parent(parent)
            .with_metadata("column", name)
            .with_metadata("data_type", "text")
    }

    #[tokio::test]
    async fn wide_table_expands_columns_for_top_parent() {
        let store = Arc::new(InMemoryStore::default());
        let parent = table_doc("table:c1:public.t", "c1", vec!["col:1", "col:2"]);
        store.seed(parent).await;
        store.seed(column_doc("col:1", "table:c1:public.t", "c1", "id")).await;
        store.seed(column_doc("col:2", "table:c1:public.t", "c1", "name")).await;

        let retriever = HierarchicalRetriever::new(store);
        let contexts = retriever
            .fetch_schemas_hierarchical(&[1.0, 0.0], "c1", 10)
            .await
            .unwrap();

        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].columns.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_child_ids_fall_back_to_summary() {
        let store = Arc::new(InMemoryStore::default());
        let mut parent = table_doc("table:c1:public.t", "c1", vec![]);
        parent
            .metadata
            .insert("child_ids".to_string(), Value::Int(42));
        store.seed(parent).await;

        let retriever = HierarchicalRetriever::new(store);
        let contexts = retriever
            .fetch_schemas_hierarchical(&[1.0, 0.0], "c1", 10)
            .await
            .unwrap();

        assert_eq!(contexts.len(), 1);
        assert!(contexts[0].columns.is_none());
    }
}
