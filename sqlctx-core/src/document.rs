//! The universal retrieval unit and its heterogeneous metadata map.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tagged-sum value for `Document::metadata`.
///
/// `metadata` mixes strings, booleans, numbers, and sequences of strings
/// (`child_ids`, `columns`, `tables`, ...). Modeling it as a typed sum with
/// typed accessors, rather than reaching for untyped `serde_json::Value`
/// everywhere a caller wants a specific field, keeps the child-id / numeric
/// stat accessors used by hierarchical retrieval and schema enrichment
/// honest about what they expect to find.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    /// Interpret this value as a list of string ids, e.g. `child_ids`.
    ///
    /// Returns `None` (rather than a partially-filled vec) if any element is
    /// not a string, so callers can distinguish "malformed `child_ids`" from
    /// "empty `child_ids`".
    #[must_use]
    pub fn as_id_list(&self) -> Option<Vec<String>> {
        let list = self.as_list()?;
        list.iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    #[must_use]
    pub fn list_of_strings(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// String-keyed heterogeneous metadata map.
pub type Metadata = BTreeMap<String, Value>;

/// The kind of retrieval unit a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Schema,
    Query,
    Performance,
    Business,
    Memory,
    Plan,
}

/// Hierarchy level, meaningful only for `DocType::Schema` documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Table,
    Column,
    Index,
    Relationship,
    None,
}

/// The universal retrieval unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Globally unique, deterministic id, e.g. `table:{conn}:{schema}.{table}`.
    pub id: String,
    /// Scopes the document to a database connection.
    pub connection_id: String,
    pub doc_type: DocType,
    /// `Level::None` for every non-schema document.
    pub level: Level,
    /// Set on child documents to reference their parent.
    pub parent_id: Option<String>,
    /// Free text used for lexical search and as embedding input.
    pub content: String,
    /// Optional short form used when a child document is shown as a preview.
    pub summary: Option<String>,
    /// Present iff this document is visible to vector search. Length must
    /// equal the store's configured dimension when present.
    pub embedding: Option<Vec<f32>>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    /// Transient per-query result score; never persisted.
    #[serde(skip)]
    pub score: Option<f32>,
}

impl Document {
    /// Construct a new document with lifecycle fields stamped at `now`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        connection_id: impl Into<String>,
        doc_type: DocType,
        level: Level,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            connection_id: connection_id.into(),
            doc_type,
            level,
            parent_id: None,
            content: content.into(),
            summary: None,
            embedding: None,
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
            access_count: 0,
            last_accessed: None,
            score: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn child_ids(&self) -> Option<Vec<String>> {
        self.metadata.get("child_ids").and_then(Value::as_id_list)
    }
}
