//! `RemoteMirrorStore`: a write-mostly `VectorStore` mirror.
//!
//! The local store is always authoritative for reads; the remote mirror
//! exists only so `AdaptiveStore` has somewhere to replicate writes to for
//! durability/shareability. Its read methods return empty results rather
//! than querying out — consulting the mirror on the read path would
//! reintroduce the latency local-first storage is meant to avoid.

use async_trait::async_trait;

use sqlctx_core::collection::Collection;
use sqlctx_core::document::{Document, Metadata};
use sqlctx_core::error::{Error, Result};
use sqlctx_core::store::{SearchFilter, StoreStats, VectorStore};

use crate::local::LocalSqlStore;

/// Remote mirror store, backed by the same schema as `LocalSqlStore` but
/// addressed over a `libsql://` URL rather than a local file.
pub struct RemoteMirrorStore {
    inner: LocalSqlStore,
}

impl RemoteMirrorStore {
    /// Connects to a remote libSQL URL. `auth_token` is empty for
    /// unauthenticated local testing setups.
    pub async fn connect(url: &str, auth_token: &str) -> Result<Self> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(|e| Error::Storage(format!("failed to connect to remote mirror: {e}")))?;
        Ok(Self {
            inner: LocalSqlStore::from_database(db, url.to_string()),
        })
    }
}

#[async_trait]
impl VectorStore for RemoteMirrorStore {
    async fn initialize(&self) -> Result<()> {
        self.inner.initialize().await
    }

    async fn index_document(&self, doc: Document) -> Result<()> {
        self.inner.index_document(doc).await
    }

    async fn batch_index(&self, docs: Vec<Document>) -> Result<()> {
        self.inner.batch_index(docs).await
    }

    async fn store_without_embedding(&self, doc: Document) -> Result<()> {
        self.inner.store_without_embedding(doc).await
    }

    async fn get_document(&self, _id: &str) -> Result<Option<Document>> {
        Ok(None)
    }

    async fn get_batch(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        Ok(vec![None; ids.len()])
    }

    async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        self.inner.update_metadata(id, metadata).await
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.inner.delete_document(id).await
    }

    async fn search_similar(
        &self,
        _embedding: &[f32],
        _k: usize,
        _filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn search_by_text(
        &self,
        _query: &str,
        _k: usize,
        _filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        self.inner.create_collection(name, dimension).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(Vec::new())
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        Ok(StoreStats::default())
    }

    async fn get_collection_stats(&self, _name: &str) -> Result<Option<Collection>> {
        Ok(None)
    }

    async fn optimize(&self) -> Result<()> {
        self.inner.optimize().await
    }

    async fn backup(&self, _path: &str) -> Result<()> {
        Err(Error::Storage("backup is not supported on the remote mirror".to_string()))
    }

    async fn restore(&self, _path: &str) -> Result<()> {
        Err(Error::Storage("restore is not supported on the remote mirror".to_string()))
    }
}
