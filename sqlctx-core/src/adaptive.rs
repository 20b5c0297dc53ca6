//! Local-first adaptive store: reads are always local, writes replicate to
//! an optional remote mirror best-effort.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::collection::Collection;
use crate::config::AdaptiveConfig;
use crate::document::{Document, Metadata};
use crate::error::Result;
use crate::store::{SearchFilter, StoreStats, VectorStore};

enum Enqueued {
    One(Document),
    Batch(Vec<Document>),
}

/// A facade over a local store and an optional remote mirror.
///
/// Reads always go to `local`. Writes commit to `local` synchronously, then
/// — if replication is enabled for this deployment tier — are enqueued for
/// best-effort asynchronous replication to `remote`, coalesced per document
/// id and retried with exponential backoff.
pub struct AdaptiveStore<L: VectorStore + 'static, R: VectorStore + 'static> {
    local: Arc<L>,
    remote: Option<Arc<R>>,
    config: AdaptiveConfig,
    in_flight: Arc<Mutex<HashSet<String>>>,
    sender: Option<mpsc::Sender<Enqueued>>,
}

impl<L: VectorStore + 'static, R: VectorStore + 'static> AdaptiveStore<L, R> {
    /// Spawns the replication worker if a remote mirror and replication are
    /// both configured.
    #[must_use]
    pub fn new(local: Arc<L>, remote: Option<Arc<R>>, config: AdaptiveConfig) -> Self {
        let in_flight = Arc::new(Mutex::new(HashSet::new()));

        let sender = if remote.is_some() && config.replicates() {
            let (tx, rx) = mpsc::channel(config.queue_capacity);
            let remote = remote.clone().unwrap();
            let in_flight = in_flight.clone();
            let max_retries = config.max_retries;
            let base_delay_ms = config.retry_base_delay_ms;
            tokio::spawn(replication_worker(rx, remote, in_flight, max_retries, base_delay_ms));
            Some(tx)
        } else {
            None
        };

        Self {
            local,
            remote,
            config,
            in_flight,
            sender,
        }
    }

    async fn enqueue(&self, doc: &Document) {
        let Some(sender) = &self.sender else {
            return;
        };

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains(&doc.id) {
                return;
            }
            in_flight.insert(doc.id.clone());
        }

        if sender.try_send(Enqueued::One(doc.clone())).is_err() {
            tracing::warn!(id = %doc.id, "adaptive replication queue full, dropping enqueue");
            self.in_flight.lock().await.remove(&doc.id);
        }
    }

    async fn enqueue_batch(&self, docs: &[Document]) {
        let Some(sender) = &self.sender else {
            return;
        };

        // Fire-and-forget batch attempt, then fall back to per-document
        // safety-net enqueues relying on idempotency.
        if sender.try_send(Enqueued::Batch(docs.to_vec())).is_err() {
            tracing::warn!("adaptive replication queue full, dropping batch enqueue");
        }

        for doc in docs {
            self.enqueue(doc).await;
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) async fn in_flight_is_empty(&self) -> bool {
        self.in_flight.lock().await.is_empty()
    }
}

async fn replication_worker<R: VectorStore + 'static>(
    mut rx: mpsc::Receiver<Enqueued>,
    remote: Arc<R>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    max_retries: u32,
    base_delay_ms: u64,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Enqueued::One(doc) => {
                let remote = remote.clone();
                let in_flight = in_flight.clone();
                tokio::spawn(async move {
                    retry_index(&*remote, doc.clone(), max_retries, base_delay_ms).await;
                    in_flight.lock().await.remove(&doc.id);
                });
            }
            Enqueued::Batch(docs) => {
                let remote = remote.clone();
                tokio::spawn(async move {
                    if let Err(e) = remote.batch_index(docs).await {
                        tracing::warn!(error = %e, "fire-and-forget remote batch_index failed");
                    }
                });
            }
        }
    }
}

async fn retry_index<R: VectorStore>(remote: &R, doc: Document, max_retries: u32, base_delay_ms: u64) {
    let mut attempt = 0;
    loop {
        match remote.index_document(doc.clone()).await {
            Ok(()) => return,
            Err(e) => {
                attempt += 1;
                if attempt >= max_retries {
                    tracing::warn!(id = %doc.id, error = %e, attempts = attempt, "remote replication exhausted retries, tolerating divergence");
                    return;
                }
                let delay = base_delay_ms * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

#[async_trait]
impl<L: VectorStore + 'static, R: VectorStore + 'static> VectorStore for AdaptiveStore<L, R> {
    async fn initialize(&self) -> Result<()> {
        self.local.initialize().await?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.initialize().await {
                tracing::warn!(error = %e, "remote mirror initialize failed, continuing local-only");
            }
        }
        Ok(())
    }

    async fn index_document(&self, doc: Document) -> Result<()> {
        self.local.index_document(doc.clone()).await?;
        self.enqueue(&doc).await;
        Ok(())
    }

    async fn batch_index(&self, docs: Vec<Document>) -> Result<()> {
        self.local.batch_index(docs.clone()).await?;
        self.enqueue_batch(&docs).await;
        Ok(())
    }

    async fn store_without_embedding(&self, doc: Document) -> Result<()> {
        self.local.store_without_embedding(doc.clone()).await?;
        self.enqueue(&doc).await;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        self.local.get_document(id).await
    }

    async fn get_batch(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        self.local.get_batch(ids).await
    }

    async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        self.local.update_metadata(id, metadata).await
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.local.delete_document(id).await
    }

    async fn search_similar(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        self.local.search_similar(embedding, k, filter).await
    }

    async fn search_by_text(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        self.local.search_by_text(query, k, filter).await
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        self.local.create_collection(name, dimension).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.local.delete_collection(name).await
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.local.list_collections().await
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        self.local.get_stats().await
    }

    async fn get_collection_stats(&self, name: &str) -> Result<Option<Collection>> {
        self.local.get_collection_stats(name).await
    }

    async fn optimize(&self) -> Result<()> {
        self.local.optimize().await
    }

    async fn backup(&self, path: &str) -> Result<()> {
        self.local.backup(path).await
    }

    async fn restore(&self, path: &str) -> Result<()> {
        self.local.restore(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tier;
    use crate::document::{DocType, Level};
    use crate::store::tests_support::InMemoryStore;

    fn doc(id: &str) -> Document {
        Document::new(id, "conn-1", DocType::Memory, Level::None, "content")
    }

    #[tokio::test]
    async fn reads_are_served_from_local_only() {
        let local = Arc::new(InMemoryStore::default());
        let store: AdaptiveStore<InMemoryStore, InMemoryStore> =
            AdaptiveStore::new(local.clone(), None, AdaptiveConfig::default());
        store.index_document(doc("a")).await.unwrap();
        assert!(store.get_document("a").await.unwrap().is_some());
    }

    /// S4: 10 concurrent writes of the same id coalesce to one local row and
    /// leave `in_flight` empty once retries complete.
    #[tokio::test]
    async fn concurrent_writes_to_same_id_coalesce() {
        let local = Arc::new(InMemoryStore::default());
        let remote = Arc::new(InMemoryStore::default());
        let store = Arc::new(AdaptiveStore::new(
            local.clone(),
            Some(remote.clone()),
            AdaptiveConfig {
                tier: Tier::Individual,
                sync_enabled: true,
                max_retries: 3,
                queue_capacity: 256,
                retry_base_delay_ms: 1,
            },
        ));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.index_document(doc("shared-id")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(local.len(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.in_flight_is_empty().await);
    }

    #[tokio::test]
    async fn enterprise_tier_skips_replication_entirely() {
        let local = Arc::new(InMemoryStore::default());
        let remote = Arc::new(InMemoryStore::default());
        let store = AdaptiveStore::new(
            local,
            Some(remote.clone()),
            AdaptiveConfig {
                tier: Tier::Enterprise,
                ..AdaptiveConfig::default()
            },
        );
        store.index_document(doc("a")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(remote.len(), 0);
    }
}
