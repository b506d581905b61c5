//! SQLite-backed corpus store with a normalized shingle index.
//!
//! Every document's content is analyzed once on insert into
//! `content_terms` (1..=`max_shingle_size` n-grams with in-document counts),
//! which answers total term frequency, document frequency and per-document
//! indexed-term queries. Busy/locked failures are retried with linear
//! back-off up to `max_retries`.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::analysis::{shingles, Analyzer};
use crate::schema::{CONTENT_TERMS_SQL, FIELD_TERMS_SQL, SCHEMA_SQL};
use crate::traits::{CorpusStore, StoreConnector};
use crate::types::*;
use termsage_core::{Error, PipelineConfig, Result};

const DB_FILE: &str = "corpus.db";

/// Connection-level options shared by every handle onto one database.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_retries: u32,
    pub busy_timeout: Duration,
    pub ttf_batch_size: usize,
    pub max_shingle_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl StoreOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_retries: config.store_max_retries,
            busy_timeout: Duration::from_millis(config.store_busy_timeout_ms),
            ttf_batch_size: config.ttf_batch_size,
            max_shingle_size: config.max_shingle_size,
        }
    }
}

/// SQLite corpus store.
pub struct SqliteCorpusStore {
    conn: Mutex<Connection>,
    db_dir: PathBuf,
    db_path: PathBuf,
    options: StoreOptions,
}

impl SqliteCorpusStore {
    /// Open or create the store. The file will be `db_dir/corpus.db`.
    pub fn open(db_dir: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let store = Self::open_handle(db_dir.as_ref(), options)?;
        info!(
            "SqliteCorpusStore initialized: {} documents, path={}",
            store.total_documents()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn open_handle(db_dir: &Path, options: StoreOptions) -> Result<Self> {
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join(DB_FILE);
        let conn = Connection::open(&db_path).map_err(map_sqlite_error)?;
        conn.busy_timeout(options.busy_timeout)
            .map_err(map_sqlite_error)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(map_sqlite_error)?;

        let full_schema = format!("{}\n{}\n{}", SCHEMA_SQL, CONTENT_TERMS_SQL, FIELD_TERMS_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::corpus(format!("Schema init failed: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_dir: db_dir.to_path_buf(),
            db_path,
            options,
        })
    }

    /// Connector that opens further independent handles onto this database.
    pub fn connector(&self) -> SqliteConnector {
        SqliteConnector {
            db_dir: self.db_dir.clone(),
            options: self.options.clone(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `op` against the connection, retrying transient failures.
    fn with_retry<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(&Connection) -> rusqlite::Result<T>,
    {
        let mut attempt = 0u32;
        loop {
            let outcome = {
                let conn = self.conn.lock();
                op(&conn)
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let err = map_sqlite_error(e);
                    if err.is_transient() && attempt < self.options.max_retries {
                        attempt += 1;
                        warn!(
                            "Transient store failure (attempt {}/{}): {}",
                            attempt, self.options.max_retries, err
                        );
                        std::thread::sleep(Duration::from_millis(50 * u64::from(attempt)));
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Ingestion
    // ---------------------------------------------------------------

    /// Insert a document and index its content.
    ///
    /// Returns `false` without writing when the id or the content hash is
    /// already present.
    pub fn add_document(&self, id: &str, content: &str) -> Result<bool> {
        let hash = content_hash(content);
        let tokens = Analyzer::Content.tokens(content);
        let counts = shingles(&tokens, self.options.max_shingle_size);
        let now = chrono::Utc::now().timestamp_millis();

        let inserted = self.with_retry(|conn| {
            let tx = conn.unchecked_transaction()?;
            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM documents WHERE id = ?1 OR content_hash = ?2",
                    params![id, hash],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO documents (id, content, content_hash, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, content, hash, now],
            )?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO content_terms (doc_id, term, tf) VALUES (?1, ?2, ?3)",
                )?;
                for (term, tf) in &counts {
                    stmt.execute(params![id, term, *tf as i64])?;
                }
            }
            tx.commit()?;
            Ok(true)
        })?;

        if inserted {
            debug!("Indexed document {} ({} shingles)", id, counts.len());
        } else {
            debug!("Duplicate document skipped: {}", id);
        }
        Ok(inserted)
    }

    /// Get a document by id.
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        self.with_retry(|conn| {
            conn.prepare_cached(&format!("{} WHERE id = ?1", SELECT_DOCUMENT))?
                .query_row(params![id], row_to_document)
                .optional()
        })
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let (terms, candidates) = self.with_retry(|conn| {
            let terms: i64 =
                conn.query_row("SELECT COUNT(DISTINCT term) FROM content_terms", [], |r| {
                    r.get(0)
                })?;
            let candidates: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT term) FROM field_terms WHERE field = ?1",
                params![Field::TermCandidates.as_str()],
                |r| r.get(0),
            )?;
            Ok((terms, candidates))
        })?;
        Ok(StoreStats {
            total_documents: self.total_documents()?,
            distinct_content_terms: terms as usize,
            distinct_candidates: candidates as usize,
            db_path: self.db_path.display().to_string(),
        })
    }
}

const SELECT_DOCUMENT: &str = "SELECT id, content, content_hash, candidates_json, \
     dict_terms_json, final_terms_json, created_at, updated_at FROM documents";

impl CorpusStore for SqliteCorpusStore {
    fn load_documents(&self, offset: usize, page_size: usize) -> Result<DocumentPage> {
        let total = self.total_documents()?;
        let docs = self.with_retry(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "{} ORDER BY rowid LIMIT ?1 OFFSET ?2",
                SELECT_DOCUMENT
            ))?;
            let rows = stmt.query_map(params![page_size as i64, offset as i64], row_to_document)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(DocumentPage { docs, total })
    }

    fn batch_update_documents(&self, docs: &[Document]) -> Result<usize> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut payload = Vec::with_capacity(docs.len());
        for doc in docs {
            payload.push((
                serde_json::to_string(&doc.candidates)?,
                serde_json::to_string(&doc.dict_terms)?,
                serde_json::to_string(&doc.final_terms)?,
            ));
        }

        self.with_retry(|conn| {
            let tx = conn.unchecked_transaction()?;
            let mut updated = 0;
            {
                let mut update = tx.prepare_cached(
                    "UPDATE documents SET candidates_json = ?1, dict_terms_json = ?2, \
                     final_terms_json = ?3, updated_at = ?4 WHERE id = ?5",
                )?;
                let mut clear = tx.prepare_cached("DELETE FROM field_terms WHERE doc_id = ?1")?;
                let mut insert = tx.prepare_cached(
                    "INSERT OR IGNORE INTO field_terms (doc_id, field, term) VALUES (?1, ?2, ?3)",
                )?;

                for (doc, (candidates, dict_terms, final_terms)) in docs.iter().zip(&payload) {
                    let count =
                        update.execute(params![candidates, dict_terms, final_terms, now, doc.id])?;
                    if count == 0 {
                        warn!("Batch update: unknown document {}", doc.id);
                        continue;
                    }
                    updated += 1;
                    clear.execute(params![doc.id])?;
                    for (field, terms) in [
                        (Field::TermCandidates, &doc.candidates),
                        (Field::DictTerms, &doc.dict_terms),
                        (Field::FinalTerms, &doc.final_terms),
                    ] {
                        for term in terms {
                            insert.execute(params![doc.id, field.as_str(), term])?;
                        }
                    }
                }
            }
            tx.commit()?;
            Ok(updated)
        })
    }

    fn term_frequency_request(
        &self,
        field: Field,
        keys: &[String],
    ) -> Result<HashMap<String, u64>> {
        if field != Field::Content {
            return Err(Error::corpus(format!(
                "field '{}' carries no term frequencies",
                field
            )));
        }
        let mut result: HashMap<String, u64> = keys.iter().map(|k| (k.clone(), 0)).collect();
        if keys.is_empty() {
            return Ok(result);
        }

        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
            "SELECT term, SUM(tf) FROM content_terms WHERE term IN ({}) GROUP BY term",
            placeholders
        );
        let rows = self.with_retry(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(keys.iter()), term_count_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;
        for (term, ttf) in rows {
            result.insert(term, ttf.max(0) as u64);
        }
        Ok(result)
    }

    fn field_terms(&self, field: Field) -> Result<HashMap<String, u64>> {
        let rows = self.with_retry(|conn| {
            if field == Field::Content {
                let mut stmt = conn
                    .prepare_cached("SELECT term, COUNT(*) FROM content_terms GROUP BY term")?;
                let rows = stmt.query_map([], term_count_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            } else {
                let mut stmt = conn.prepare_cached(
                    "SELECT term, COUNT(*) FROM field_terms WHERE field = ?1 GROUP BY term",
                )?;
                let rows = stmt.query_map(params![field.as_str()], term_count_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
        })?;
        Ok(rows
            .into_iter()
            .map(|(term, df)| (term, df.max(0) as u64))
            .collect())
    }

    fn normalize_term(&self, term: &str, analyzer: &str) -> Result<String> {
        Ok(Analyzer::from_name(analyzer)?.normalize(term))
    }

    fn indexed_terms(&self, doc_id: &str) -> Result<HashMap<String, u64>> {
        let rows = self.with_retry(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT term, tf FROM content_terms WHERE doc_id = ?1")?;
            let rows = stmt.query_map(params![doc_id], term_count_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(rows
            .into_iter()
            .map(|(term, tf)| (term, tf.max(0) as u64))
            .collect())
    }

    fn total_documents(&self) -> Result<usize> {
        let count: i64 = self.with_retry(|conn| {
            conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        })?;
        Ok(count.max(0) as usize)
    }

    fn ttf_batch_size(&self) -> usize {
        self.options.ttf_batch_size
    }
}

/// Opens a fresh SQLite handle per call.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    db_dir: PathBuf,
    options: StoreOptions,
}

impl SqliteConnector {
    pub fn new(db_dir: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            db_dir: db_dir.into(),
            options,
        }
    }
}

impl StoreConnector for SqliteConnector {
    fn connect(&self) -> Result<Box<dyn CorpusStore>> {
        let store = SqliteCorpusStore::open_handle(&self.db_dir, self.options.clone())?;
        debug!("Opened worker connection to {}", store.db_path.display());
        Ok(Box::new(store))
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        content: row.get(1)?,
        content_hash: row.get(2)?,
        candidates: parse_terms(row.get(3)?),
        dict_terms: parse_terms(row.get(4)?),
        final_terms: parse_terms(row.get(5)?),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn term_count_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn parse_terms(json: Option<String>) -> BTreeSet<String> {
    json.as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn map_sqlite_error(e: rusqlite::Error) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) =>
        {
            Error::transient(e.to_string())
        }
        _ => Error::corpus(e.to_string()),
    }
}

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
