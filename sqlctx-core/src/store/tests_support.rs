//! Minimal in-memory `VectorStore`, shared across unit tests in other
//! modules that need a store without pulling in `sqlctx-storage`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::collection::Collection;
use crate::document::{Document, Metadata};
use crate::error::Result;

use super::{cosine_similarity, rank_candidates, SearchFilter, StoreStats, VectorStore};

#[derive(Default)]
pub struct InMemoryStore {
    docs: Mutex<HashMap<String, Document>>,
    collections: Mutex<HashMap<String, Collection>>,
}

impl InMemoryStore {
    /// Test helper: insert a document directly, bypassing `VectorStore`.
    pub async fn seed(&self, doc: Document) {
        self.docs.lock().unwrap().insert(doc.id.clone(), doc);
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn initialize(&self) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        for c in Collection::defaults(384) {
            collections.entry(c.name.clone()).or_insert(c);
        }
        Ok(())
    }

    async fn index_document(&self, doc: Document) -> Result<()> {
        self.docs.lock().unwrap().insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn batch_index(&self, docs: Vec<Document>) -> Result<()> {
        let mut store = self.docs.lock().unwrap();
        for doc in docs {
            store.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    async fn store_without_embedding(&self, mut doc: Document) -> Result<()> {
        doc.embedding = None;
        self.docs.lock().unwrap().insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.docs.lock().unwrap().get(id).cloned())
    }

    async fn get_batch(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        let store = self.docs.lock().unwrap();
        Ok(ids.iter().map(|id| store.get(id).cloned()).collect())
    }

    async fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        let mut store = self.docs.lock().unwrap();
        if let Some(doc) = store.get_mut(id) {
            doc.metadata.extend(metadata);
            doc.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.docs.lock().unwrap().remove(id);
        Ok(())
    }

    async fn search_similar(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        let store = self.docs.lock().unwrap();
        let candidates: Vec<(Document, f32)> = store
            .values()
            .filter(|d| filter.matches(d) && d.embedding.is_some())
            .map(|d| {
                let score = cosine_similarity(d.embedding.as_ref().unwrap(), embedding);
                (d.clone(), score)
            })
            .collect();
        Ok(rank_candidates(candidates).into_iter().take(k).collect())
    }

    async fn search_by_text(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Document>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let query = query.to_lowercase();
        let store = self.docs.lock().unwrap();
        let candidates: Vec<(Document, f32)> = store
            .values()
            .filter(|d| filter.matches(d))
            .filter_map(|d| {
                let hits = d.content.to_lowercase().matches(&query).count();
                if hits > 0 {
                    Some((d.clone(), hits as f32))
                } else {
                    None
                }
            })
            .collect();
        Ok(rank_candidates(candidates).into_iter().take(k).collect())
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), Collection::new(name, dimension));
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.collections.lock().unwrap().values().cloned().collect())
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            collections: self.collections.lock().unwrap().values().cloned().collect(),
        })
    }

    async fn get_collection_stats(&self, name: &str) -> Result<Option<Collection>> {
        Ok(self.collections.lock().unwrap().get(name).cloned())
    }

    async fn optimize(&self) -> Result<()> {
        Ok(())
    }

    async fn backup(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    async fn restore(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}
