//! # sqlctx-core
//!
//! Retrieval core for a natural-language-to-SQL context engine. Given a
//! query and a target database connection, assembles a ranked,
//! token-budgeted bundle of schema fragments, historical query patterns,
//! business rules, and performance hints for a downstream prompt formatter.
//!
//! Storage-backend agnostic: this crate depends on no concrete database.
//! A caller supplies a [`store::VectorStore`] implementation — typically
//! `sqlctx-storage`'s libsql-backed store wrapped in an [`adaptive::AdaptiveStore`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqlctx_core::adaptive::AdaptiveStore;
//! use sqlctx_core::config::AdaptiveConfig;
//! use sqlctx_core::context_builder::ContextBuilder;
//! use sqlctx_core::embeddings::{EmbeddingCache, EmbeddingService, OfflineProjector};
//! use sqlctx_core::store::VectorStore;
//!
//! # async fn run<L: VectorStore + 'static>(local: Arc<L>) -> sqlctx_core::error::Result<()> {
//! let store = Arc::new(AdaptiveStore::<L, L>::new(local, None, AdaptiveConfig::default()));
//! store.initialize().await?;
//!
//! let embeddings = Arc::new(EmbeddingService::new(
//!     Box::new(OfflineProjector::new(384)),
//!     EmbeddingCache::default(),
//! ));
//!
//! let builder = ContextBuilder::new(store, embeddings);
//! let output = builder
//!     .build_with_budget("which customers churned last quarter", "conn-1", 4000, false)
//!     .await?;
//! println!("confidence: {}", output.confidence);
//! # Ok(())
//! # }
//! ```

pub mod adaptive;
pub mod budget;
pub mod collection;
pub mod config;
pub mod constants;
pub mod context_builder;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod hierarchical;
pub mod pattern_matcher;
pub mod stats_enricher;
pub mod store;

pub use error::{Error, Result};
