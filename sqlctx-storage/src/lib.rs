//! # sqlctx-storage
//!
//! libSQL-backed [`VectorStore`](sqlctx_core::store::VectorStore)
//! implementations for the context-engine retrieval core: [`LocalSqlStore`]
//! (the authoritative local file store) and [`RemoteMirrorStore`] (a
//! write-mostly mirror for the adaptive facade to replicate into).
//!
//! Neither type talks to the other; composing them into the local-first,
//! best-effort-replicated storage behavior described by the retrieval core
//! is `sqlctx_core::adaptive::AdaptiveStore`'s job.

pub mod fts;
pub mod local;
pub mod remote;
pub mod schema;
pub mod serialize;

pub use local::LocalSqlStore;
pub use remote::RemoteMirrorStore;
