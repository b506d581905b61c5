//! Database schema SQL.

/// Documents with their annotation fields stored as JSON arrays.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    content_hash TEXT UNIQUE,
    candidates_json TEXT,
    dict_terms_json TEXT,
    final_terms_json TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_documents_hash ON documents(content_hash);
"#;

/// Shingle index over normalized content, written once per document.
pub const CONTENT_TERMS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS content_terms (
    doc_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    term TEXT NOT NULL,
    tf INTEGER NOT NULL,
    PRIMARY KEY (doc_id, term)
);

CREATE INDEX IF NOT EXISTS idx_content_terms_term ON content_terms(term);
"#;

/// Per-document rows for the multi-valued annotation fields.
pub const FIELD_TERMS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS field_terms (
    doc_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    field TEXT NOT NULL,
    term TEXT NOT NULL,
    PRIMARY KEY (doc_id, field, term)
);

CREATE INDEX IF NOT EXISTS idx_field_terms_field ON field_terms(field, term);
"#;
