//! DDL for the portable persistent schema, as named `const`
//! strings rather than a migration framework.

pub const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY NOT NULL,
    connection_id TEXT NOT NULL,
    type TEXT NOT NULL,
    level TEXT NOT NULL,
    parent_id TEXT,
    content TEXT NOT NULL,
    summary TEXT,
    metadata TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    access_count INTEGER NOT NULL DEFAULT 0,
    last_accessed INTEGER
)
"#;

pub const CREATE_EMBEDDINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS embeddings (
    document_id TEXT PRIMARY KEY NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dimension INTEGER NOT NULL
)
"#;

pub const CREATE_COLLECTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY NOT NULL,
    vector_size INTEGER NOT NULL,
    distance TEXT NOT NULL,
    document_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

pub const CREATE_DOCUMENTS_CONNECTION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_documents_connection
ON documents(connection_id, type, level)
"#;

pub const CREATE_DOCUMENTS_PARENT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_documents_parent
ON documents(parent_id)
"#;

/// DDL run, in order, by `initialize()`. Idempotent: every statement is
/// `IF NOT EXISTS`.
pub const ALL_TABLES: &[&str] = &[
    CREATE_DOCUMENTS_TABLE,
    CREATE_EMBEDDINGS_TABLE,
    CREATE_COLLECTIONS_TABLE,
    CREATE_DOCUMENTS_CONNECTION_INDEX,
    CREATE_DOCUMENTS_PARENT_INDEX,
];
