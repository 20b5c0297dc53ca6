//! `LocalSqlStore`: the authoritative local `VectorStore`, backed by a
//! libSQL file database.
//!
//! Opens a libSQL `Database`/`Connection`, runs schema DDL idempotently on
//! `initialize()`, and maps libsql errors to `Error::Storage`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Builder, Connection, Database, Row};
use tracing::debug;

use sqlctx_core::collection::{Collection, Distance};
use sqlctx_core::document::{DocType, Document, Level, Metadata};
use sqlctx_core::error::{Error, Result};
use sqlctx_core::store::{cosine_similarity, rank_candidates, SearchFilter, StoreStats, VectorStore};

use crate::{fts, schema, serialize};

fn doc_type_str(t: DocType) -> &'static str {
    match t {
        DocType::Schema => "schema",
        DocType::Query => "query",
        DocType::Performance => "performance",
        DocType::Business => "business",
        DocType::Memory => "memory",
        DocType::Plan => "plan",
    }
}

fn doc_type_from_str(s: &str) -> Result<DocType> {
    match s {
        "schema" => Ok(DocType::Schema),
        "query" => Ok(DocType::Query),
        "performance" => Ok(DocType::Performance),
        "business" => Ok(DocType::Business),
        "memory" => Ok(DocType::Memory),
        "plan" => Ok(DocType::Plan),
        other => Err(Error::Storage(format!("unknown document type {other:?}"))),
    }
}

fn level_str(l: Level) -> &'static str {
    match l {
        Level::Table => "table",
        Level::Column => "column",
        Level::Index => "index",
        Level::Relationship => "relationship",
        Level::None => "none",
    }
}

fn level_from_str(s: &str) -> Result<Level> {
    match s {
        "table" => Ok(Level::Table),
        "column" => Ok(Level::Column),
        "index" => Ok(Level::Index),
        "relationship" => Ok(Level::Relationship),
        "none" => Ok(Level::None),
        other => Err(Error::Storage(format!("unknown level {other:?}"))),
    }
}

fn distance_str(d: Distance) -> &'static str {
    match d {
        Distance::Cosine => "cosine",
        Distance::Euclidean => "euclidean",
    }
}

fn distance_from_str(s: &str) -> Result<Distance> {
    match s {
        "cosine" => Ok(Distance::Cosine),
        "euclidean" => Ok(Distance::Euclidean),
        other => Err(Error::Storage(format!("unknown distance {other:?}"))),
    }
}

fn timestamp_to_dt(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

/// Local, file-backed `VectorStore` implementation over libSQL/SQLite.
///
/// Reads and writes always go straight to this store; it never talks to a
/// remote mirror itself (that's `AdaptiveStore`'s job, one layer up).
pub struct LocalSqlStore {
    db: Arc<Database>,
    path: String,
}

impl LocalSqlStore {
    /// Opens (creating if absent) a local libSQL file at `path`. Does not
    /// run DDL; call `initialize()` before first use.
    pub async fn open(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| Error::Storage(format!("failed to open local database: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            path: path.to_string(),
        })
    }

    /// Wraps an already-open `Database`, e.g. an in-memory one used in tests.
    #[must_use]
    pub fn from_database(db: Database, path: impl Into<String>) -> Self {
        Self {
            db: Arc::new(db),
            path: path.into(),
        }
    }

    fn connect(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| Error::Storage(format!("failed to open connection: {e}")))
    }

    async fn row_to_document(&self, conn: &Connection, row: &Row) -> Result<Document> {
        let id: String = row.get(0).map_err(|e| Error::Storage(e.to_string()))?;
        let connection_id: String = row.get(1).map_err(|e| Error::Storage(e.to_string()))?;
        let doc_type: String = row.get(2).map_err(|e| Error::Storage(e.to_string()))?;
        let level: String = row.get(3).map_err(|e| Error::Storage(e.to_string()))?;
        let parent_id: Option<String> = row.get(4).ok();
        let content: String = row.get(5).map_err(|e| Error::Storage(e.to_string()))?;
        let summary: Option<String> = row.get(6).ok();
        let metadata_json: String = row.get(7).map_err(|e| Error::Storage(e.to_string()))?;
        let created_at: i64 = row.get(8).map_err(|e| Error::Storage(e.to_string()))?;
        let updated_at: i64 = row.get(9).map_err(|e| Error::Storage(e.to_string()))?;
        let access_count: i64 = row.get(10).map_err(|e| Error::Storage(e.to_string()))?;
        let last_accessed: Option<i64> = row.get(11).ok();

        let embedding = self.fetch_embedding(conn, &id).await?;

        Ok(Document {
            id,
            connection_id,
            doc_type: doc_type_from_str(&doc_type)?,
            level: level_from_str(&level)?,
            parent_id,
            content,
            summary,
            embedding,
            metadata: serialize::metadata_from_json(&metadata_json)?,
            created_at: timestamp_to_dt(created_at),
            updated_at: timestamp_to_dt(updated_at),
            access_count: access_count.max(0) as u64,
            last_accessed: last_accessed.map(timestamp_to_dt),
            score: None,
        })
    }

    async fn fetch_embedding(&self, conn: &Connection, id: &str) -> Result<Option<Vec<f32>>> {
        let mut rows = conn
            .query("SELECT embedding FROM embeddings WHERE document_id = ?1", params![id.to_string()])
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        match rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            Some(row) => {
                let blob: Vec<u8> = row.get(0).map_err(|e| Error::Storage(e.to_string()))?;
                Ok(Some(serialize::decode_embedding(&blob)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_document_row(&self, conn: &Connection, doc: &Document) -> Result<()> {
        let existed = self.get_document_row_exists(conn, &doc.id).await?;
        let metadata_json = serialize::metadata_to_json(&doc.metadata)?;

        conn.execute(
            r#"
            INSERT INTO documents (
                id, connection_id, type, level, parent_id, content, summary,
                metadata, created_at, updated_at, access_count, last_accessed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                connection_id = excluded.connection_id,
                type = excluded.type,
                level = excluded.level,
                parent_id = excluded.parent_id,
                content = excluded.content,
                summary = excluded.summary,
                metadata = excluded.metadata,
                updated_at = excluded.updated_at,
                access_count = excluded.access_count,
                last_accessed = excluded.last_accessed
            "#,
            params![
                doc.id.clone(),
                doc.connection_id.clone(),
                doc_type_str(doc.doc_type).to_string(),
                level_str(doc.level).to_string(),
                doc.parent_id.clone(),
                doc.content.clone(),
                doc.summary.clone(),
                metadata_json,
                doc.created_at.timestamp(),
                doc.updated_at.timestamp(),
                doc.access_count as i64,
                doc.last_accessed.map(|t| t.timestamp()),
            ],
        )
        .await
        .map_err(|e| Error::Storage(format!("failed to upsert document: {e}")))?;

        if !existed {
            self.bump_collection_count(conn, doc.doc_type).await?;
        }
        Ok(())
    }

    async fn get_document_row_exists(&self, conn: &Connection, id: &str) -> Result<bool> {
        let mut rows = conn
            .query("SELECT 1 FROM documents WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(rows.next().await.map_err(|e| Error::Storage(e.to_string()))?.is_some())
    }

    async fn bump_collection_count(&self, conn: &Connection, doc_type: DocType) -> Result<()> {
        let collection = collection_for(doc_type);
        conn.execute(
            "UPDATE collections SET document_count = document_count + 1, updated_at = ?1 WHERE name = ?2",
            params![Utc::now().timestamp(), collection],
        )
        .await
        .map_err(|e| Error::Storage(format!("failed to bump collection count: {e}")))?;
        Ok(())
    }

    async fn upsert_embedding_row(&self, conn: &Connection, doc: &Document) -> Result<()> {
        match &doc.embedding {
            Some(vector) => {
                let blob = serialize::encode_embedding(vector);
                conn.execute(
                    r#"
                    INSERT INTO embeddings (document_id, embedding, dimension)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(document_id) DO UPDATE SET
                        embedding = excluded.embedding,
                        dimension = excluded.dimension
                    "#,
                    params![doc.id.clone(), blob, vector.len() as i64],
                )
                .await
                .map_err(|e| Error::Storage(format!("failed to upsert embedding: {e}")))?;
            }
            None => {
                conn.execute(
                    "DELETE FROM embeddings WHERE document_id = ?1",
                    params![doc.id.clone()],
                )
                .await
                .map_err(|e| Error::Storage(format!("failed to clear embedding: {e}")))?;
            }
        }
        Ok(())
    }

    async fn index_one(&self, conn: &Connection, doc: Document) -> Result<()> {
        self.upsert_document_row(conn, &doc).await?;
        self.upsert_embedding_row(conn, &doc).await?;
        Ok(())
    }
}

fn collection_for(doc_type: DocType) -> &'static str {
    match doc_type {
        DocType::Schema => "schemas",
        DocType::Query | DocType::Plan => "queries",
        DocType::Performance => "performance",
        DocType::Business => "business",
        DocType::Memory => "memory",
    }
}

#[async_trait]
impl VectorStore for LocalSqlStore {
    async fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        for statement in schema::ALL_TABLES {
            conn.execute(statement, ())
                .await
                .map_err(|e| Error::Storage(format!("schema migration failed: {e}")))?;
        }
        for statement in fts::ALL_FTS {
            conn.execute(statement, ())
                .await
                .map_err(|e| Error::Storage(format!("fts migration failed: {e}")))?;
        }
        for collection in Collection::defaults(384) {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO collections (name, vector_size, distance, document_count, created_at, updated_at)
                VALUES (?1, ?2, ?3, 0, ?4, ?4)
                "#,
                params![
                    collection.name.clone(),
                    collection.vector_size as i64,
                    distance_str(collection.distance).to_string(),
                    collection.created_at.timestamp(),
                ],
            )
            .await
            .map_err(|e| Error::Storage(format!("failed to seed collection: {e}")))?;
        }
        debug!(path = %self.path, "local store initialized");
        Ok(())
    }

    async fn index_document(&self, doc: Document) -> Result<()> {
        let conn = self.connect()?;
        self.index_one(&conn, doc).await
    }

    async fn batch_index(&self, docs: Vec<Document>) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("BEGIN", ())
            .await
            .map_err(|e| Error::Storage(format!("failed to begin transaction: {e}")))?;
        for doc in docs {
            if let Err(e) = self.index_one(&conn, doc).await {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(e);
            }
        }
        conn.execute("COMMIT", ())
            .await
            .map_err(|e| Error::Storage(format!("failed to commit transaction: {e}")))?;
        Ok(())
    }

    async fn store_without_embedding(&self, mut doc: Document) -> Result<()> {
        doc.embedding = None;
        let conn = self.connect()?;
        self.index_one(&conn, doc).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, connection_id, type, level, parent_id, content, summary,
                       metadata, created_at, updated_at, access_count, last_accessed
                FROM documents WHERE id = ?1
                "#,
                params![id.to_string()],
            )
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        match rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            Some(row) => Ok(Some(self.row_to_document(&conn, &row).await?)),
            None => Ok(None),
        }
    }

    async fn get_batch(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get_document(id).await?);
        }
        Ok(out)
    }

    async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        let Some(mut doc) = self.get_document(id).await? else {
            return Err(Error::Storage(format!("document {id} not found")));
        };
        for (key, value) in metadata {
            doc.metadata.insert(key, value);
        }
        doc.updated_at = Utc::now();
        let conn = self.connect()?;
        self.upsert_document_row(&conn, &doc).await
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        let conn = self.connect()?;
        let children = conn
            .query("SELECT id FROM documents WHERE parent_id = ?1", params![id.to_string()])
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        let mut rows = children;
        let mut child_ids = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            child_ids.push(row.get::<String>(0).map_err(|e| Error::Storage(e.to_string()))?);
        }
        for child_id in child_ids {
            conn.execute("DELETE FROM embeddings WHERE document_id = ?1", params![child_id.clone()])
                .await
                .map_err(|e| Error::Storage(e.to_string()))?;
            conn.execute("DELETE FROM documents WHERE id = ?1", params![child_id])
                .await
                .map_err(|e| Error::Storage(e.to_string()))?;
        }
        conn.execute("DELETE FROM embeddings WHERE document_id = ?1", params![id.to_string()])
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(|e| Error::Storage(format!("failed to delete document: {e}")))?;
        Ok(())
    }

    async fn search_similar(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                r#"
                SELECT d.id, d.connection_id, d.type, d.level, d.parent_id, d.content, d.summary,
                       d.metadata, d.created_at, d.updated_at, d.access_count, d.last_accessed
                FROM documents d
                JOIN embeddings e ON e.document_id = d.id
                "#,
                (),
            )
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            let doc = self.row_to_document(&conn, &row).await?;
            if !filter.matches(&doc) {
                continue;
            }
            let Some(doc_embedding) = doc.embedding.as_deref() else {
                continue;
            };
            let score = cosine_similarity(embedding, doc_embedding);
            candidates.push((doc, score));
        }

        let ranked = rank_candidates(candidates);
        Ok(ranked.into_iter().take(k).collect())
    }

    async fn search_by_text(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        // Overfetch from FTS, then apply the structured filter in Rust: the
        // virtual table only knows about `id` and `content`.
        let wide_limit = (k.max(1) * 4) as i64;
        let mut rows = conn
            .query(
                "SELECT id, rank FROM documents_fts WHERE documents_fts MATCH ?1 ORDER BY rank LIMIT ?2",
                params![query.to_string(), wide_limit],
            )
            .await
            .map_err(|e| Error::Storage(format!("fts query failed: {e}")))?;

        let mut hits = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            hits.push(fts::FtsHit {
                id: row.get(0).map_err(|e| Error::Storage(e.to_string()))?,
                rank: row.get(1).map_err(|e| Error::Storage(e.to_string()))?,
            });
        }

        let mut out = Vec::with_capacity(k);
        for hit in hits {
            if out.len() == k {
                break;
            }
            if let Some(mut doc) = self.get_document(&hit.id).await? {
                if filter.matches(&doc) {
                    // fts5's `rank` is more negative for better matches; flip the
                    // sign so higher `doc.score` means a better match, as `rank_candidates` expects.
                    doc.score = Some(-hit.rank as f32);
                    out.push(doc);
                }
            }
        }
        Ok(out)
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().timestamp();
        conn.execute(
            r#"
            INSERT INTO collections (name, vector_size, distance, document_count, created_at, updated_at)
            VALUES (?1, ?2, 'cosine', 0, ?3, ?3)
            ON CONFLICT(name) DO UPDATE SET vector_size = excluded.vector_size
            "#,
            params![name.to_string(), dimension as i64, now],
        )
        .await
        .map_err(|e| Error::Storage(format!("failed to create collection: {e}")))?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM collections WHERE name = ?1", params![name.to_string()])
            .await
            .map_err(|e| Error::Storage(format!("failed to delete collection: {e}")))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT name, vector_size, distance, document_count, created_at, updated_at FROM collections ORDER BY name",
                (),
            )
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            out.push(row_to_collection(&row)?);
        }
        Ok(out)
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            collections: self.list_collections().await?,
        })
    }

    async fn get_collection_stats(&self, name: &str) -> Result<Option<Collection>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT name, vector_size, distance, document_count, created_at, updated_at FROM collections WHERE name = ?1",
                params![name.to_string()],
            )
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        match rows.next().await.map_err(|e| Error::Storage(e.to_string()))? {
            Some(row) => Ok(Some(row_to_collection(&row)?)),
            None => Ok(None),
        }
    }

    async fn optimize(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("PRAGMA optimize", ())
            .await
            .map_err(|e| Error::Storage(format!("optimize failed: {e}")))?;
        Ok(())
    }

    async fn backup(&self, path: &str) -> Result<()> {
        tokio::fs::copy(&self.path, path)
            .await
            .map_err(Error::Io)?;
        Ok(())
    }

    async fn restore(&self, path: &str) -> Result<()> {
        tokio::fs::copy(path, &self.path).await.map_err(Error::Io)?;
        Ok(())
    }
}

fn row_to_collection(row: &Row) -> Result<Collection> {
    let name: String = row.get(0).map_err(|e| Error::Storage(e.to_string()))?;
    let vector_size: i64 = row.get(1).map_err(|e| Error::Storage(e.to_string()))?;
    let distance: String = row.get(2).map_err(|e| Error::Storage(e.to_string()))?;
    let document_count: i64 = row.get(3).map_err(|e| Error::Storage(e.to_string()))?;
    let created_at: i64 = row.get(4).map_err(|e| Error::Storage(e.to_string()))?;
    let updated_at: i64 = row.get(5).map_err(|e| Error::Storage(e.to_string()))?;
    Ok(Collection {
        name,
        vector_size: vector_size.max(0) as usize,
        distance: distance_from_str(&distance)?,
        document_count: document_count.max(0) as u64,
        created_at: timestamp_to_dt(created_at),
        updated_at: timestamp_to_dt(updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlctx_core::document::{DocType, Level};

    async fn temp_store() -> (LocalSqlStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.db");
        let store = LocalSqlStore::open(path.to_str().unwrap()).await.unwrap();
        store.initialize().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (store, _dir) = temp_store().await;
        store.initialize().await.unwrap();
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.collections.len(), 5);
    }

    #[tokio::test]
    async fn index_then_fetch_roundtrips_embedding_bit_exactly() {
        let (store, _dir) = temp_store().await;
        let doc = Document::new("table:c1:public.orders", "c1", DocType::Schema, Level::Table, "orders table")
            .with_embedding(vec![0.1, -2.5, 3.0, f32::MIN_POSITIVE]);
        store.index_document(doc.clone()).await.unwrap();

        let fetched = store.get_document(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.embedding, doc.embedding);
        assert_eq!(fetched.content, "orders table");
    }

    #[tokio::test]
    async fn reindexing_same_id_is_idempotent_upsert() {
        let (store, _dir) = temp_store().await;
        let doc = Document::new("table:c1:public.orders", "c1", DocType::Schema, Level::Table, "orders table")
            .with_embedding(vec![0.1, 0.2]);
        store.index_document(doc.clone()).await.unwrap();
        store.index_document(doc.clone()).await.unwrap();

        let stats = store.get_collection_stats("schemas").await.unwrap().unwrap();
        assert_eq!(stats.document_count, 1);
    }

    #[tokio::test]
    async fn search_by_text_matches_fts_content() {
        let (store, _dir) = temp_store().await;
        let doc = Document::new("table:c1:public.orders", "c1", DocType::Schema, Level::Table, "orders table with customer_id")
            .with_embedding(vec![0.1, 0.2]);
        store.index_document(doc).await.unwrap();

        let hits = store
            .search_by_text("customer_id", 5, &SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn search_by_text_empty_query_returns_empty_not_error() {
        let (store, _dir) = temp_store().await;
        let hits = store.search_by_text("", 5, &SearchFilter::default()).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_similar_filters_by_connection() {
        let (store, _dir) = temp_store().await;
        store
            .index_document(
                Document::new("a", "conn-1", DocType::Schema, Level::Table, "a").with_embedding(vec![1.0, 0.0]),
            )
            .await
            .unwrap();
        store
            .index_document(
                Document::new("b", "conn-2", DocType::Schema, Level::Table, "b").with_embedding(vec![1.0, 0.0]),
            )
            .await
            .unwrap();

        let hits = store
            .search_similar(&[1.0, 0.0], 10, &SearchFilter::default().with_connection("conn-1"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn wide_table_parent_and_columns_are_independently_retrievable() {
        let (store, _dir) = temp_store().await;
        let mut children = Vec::new();
        for i in 0..50 {
            children.push(format!("column:c1:public.wide.col{i}"));
        }
        let parent = Document::new("table:c1:public.wide", "c1", DocType::Schema, Level::Table, "wide table")
            .with_embedding(vec![1.0, 0.0])
            .with_metadata(
                "child_ids",
                sqlctx_core::document::Value::list_of_strings(children.iter().cloned()),
            );
        store.index_document(parent.clone()).await.unwrap();

        for (i, child_id) in children.iter().enumerate() {
            let child = Document::new(child_id, "c1", DocType::Schema, Level::Column, format!("col{i}"))
                .with_parent(parent.id.clone());
            store.store_without_embedding(child).await.unwrap();
        }

        let hits = store
            .search_similar(&[1.0, 0.0], 10, &SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, parent.id);

        let batch = store.get_batch(&children).await.unwrap();
        assert!(batch.iter().all(Option::is_some));
    }
}
