//! End-to-end coverage of `LocalSqlStore` through the `VectorStore` trait
//! object, against a real tempfile-backed libSQL database.
#![allow(clippy::unwrap_used)]

use sqlctx_core::document::{DocType, Document, Level, Value};
use sqlctx_core::store::{RrfConfig, SearchFilter, VectorStore};
use sqlctx_storage::LocalSqlStore;

async fn open_store() -> (LocalSqlStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ctx.db");
    let store = LocalSqlStore::open(path.to_str().unwrap()).await.unwrap();
    store.initialize().await.unwrap();
    (store, dir)
}

#[tokio::test]
async fn hybrid_search_fuses_vector_and_text_results() {
    let (store, _dir) = open_store().await;

    store
        .index_document(
            Document::new("a", "conn-1", DocType::Query, Level::None, "slow query against orders table")
                .with_embedding(vec![1.0, 0.0, 0.0]),
        )
        .await
        .unwrap();
    store
        .index_document(
            Document::new("b", "conn-1", DocType::Query, Level::None, "fast query against customers table")
                .with_embedding(vec![0.0, 1.0, 0.0]),
        )
        .await
        .unwrap();

    let results = store
        .hybrid_search(
            "orders",
            &[1.0, 0.0, 0.0],
            5,
            &SearchFilter::default().with_connection("conn-1"),
            &RrfConfig::default(),
        )
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].id, "a");
}

#[tokio::test]
async fn batch_index_is_transactional_and_queries_with_quotes_are_not_injections() {
    let (store, _dir) = open_store().await;

    let docs = vec![
        Document::new("t1", "conn-1", DocType::Schema, Level::Table, "orders'; DROP TABLE documents; --")
            .with_embedding(vec![0.5, 0.5]),
        Document::new("t2", "conn-1", DocType::Schema, Level::Table, "customers").with_embedding(vec![0.1, 0.9]),
    ];
    store.batch_index(docs).await.unwrap();

    let fetched = store.get_document("t1").await.unwrap().unwrap();
    assert!(fetched.content.contains("DROP TABLE"));

    let stats = store.get_collection_stats("schemas").await.unwrap().unwrap();
    assert_eq!(stats.document_count, 2);
}

#[tokio::test]
async fn delete_document_cascades_to_embedding_and_children() {
    let (store, _dir) = open_store().await;

    let parent = Document::new("table:c1:public.wide", "c1", DocType::Schema, Level::Table, "wide table")
        .with_embedding(vec![1.0, 0.0])
        .with_metadata("child_ids", Value::list_of_strings(["col0", "col1"]));
    store.index_document(parent.clone()).await.unwrap();
    store
        .store_without_embedding(
            Document::new("col0", "c1", DocType::Schema, Level::Column, "col0").with_parent(parent.id.clone()),
        )
        .await
        .unwrap();
    store
        .store_without_embedding(
            Document::new("col1", "c1", DocType::Schema, Level::Column, "col1").with_parent(parent.id.clone()),
        )
        .await
        .unwrap();

    store.delete_document(&parent.id).await.unwrap();

    assert!(store.get_document(&parent.id).await.unwrap().is_none());
    assert!(store.get_document("col0").await.unwrap().is_none());
    assert!(store.get_document("col1").await.unwrap().is_none());
}

#[tokio::test]
async fn update_metadata_merges_without_clobbering_other_keys() {
    let (store, _dir) = open_store().await;
    let doc = Document::new("x", "c1", DocType::Memory, Level::None, "note")
        .with_metadata("tag", Value::string("kept"));
    store.index_document(doc).await.unwrap();

    let mut patch = sqlctx_core::document::Metadata::new();
    patch.insert("new_key".to_string(), Value::string("added"));
    store.update_metadata("x", patch).await.unwrap();

    let fetched = store.get_document("x").await.unwrap().unwrap();
    assert_eq!(fetched.metadata.get("tag").and_then(Value::as_str), Some("kept"));
    assert_eq!(fetched.metadata.get("new_key").and_then(Value::as_str), Some("added"));
}
