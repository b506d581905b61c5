//! Corpus store seam.
//!
//! `CorpusStore` abstracts the document index backend. The SQLite
//! implementation lives in [`crate::sqlite`]; tests substitute fakes.
//! `StoreConnector` hands each worker its own independent handle.

use std::collections::{HashMap, HashSet};

use termsage_core::config::DEFAULT_TTF_BATCH_SIZE;
use termsage_core::{NormalizationCache, Result};
use tracing::debug;

use crate::types::{Document, DocumentPage, Field, TermFrequencies};

/// Analyzer applied to every frequency lookup key.
pub const FREQUENCY_ANALYZER: &str = "content";

pub trait CorpusStore: Send + Sync {
    /// Load `page_size` documents starting at `offset`, in stable order.
    fn load_documents(&self, offset: usize, page_size: usize) -> Result<DocumentPage>;

    /// Persist the annotation fields of the given documents. Returns the
    /// number of documents updated.
    fn batch_update_documents(&self, docs: &[Document]) -> Result<usize>;

    /// A single backend request: ttf for already-normalized keys. Keys that
    /// do not occur in the corpus map to 0.
    fn term_frequency_request(&self, field: Field, keys: &[String])
        -> Result<HashMap<String, u64>>;

    /// All distinct terms of a field → document frequency.
    fn field_terms(&self, field: Field) -> Result<HashMap<String, u64>>;

    fn normalize_term(&self, term: &str, analyzer: &str) -> Result<String>;

    /// Normalized content terms of one document → in-document frequency.
    fn indexed_terms(&self, doc_id: &str) -> Result<HashMap<String, u64>>;

    fn total_documents(&self) -> Result<usize>;

    /// Keys per `term_frequency_request`.
    fn ttf_batch_size(&self) -> usize {
        DEFAULT_TTF_BATCH_SIZE
    }

    /// Corpus-wide total term frequency for a set of surface terms.
    fn total_term_frequency(&self, field: Field, terms: &[String]) -> Result<TermFrequencies> {
        self.total_term_frequency_cached(field, terms, None)
    }

    /// [`total_term_frequency`](Self::total_term_frequency) with an optional
    /// run-scoped normalization cache.
    ///
    /// Terms are normalized, de-duplicated by key and queried in batches of
    /// [`ttf_batch_size`](Self::ttf_batch_size). Terms that normalize to an
    /// empty key are mapped but never queried.
    fn total_term_frequency_cached(
        &self,
        field: Field,
        terms: &[String],
        cache: Option<&NormalizationCache>,
    ) -> Result<TermFrequencies> {
        let mut result = TermFrequencies::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut keys: Vec<String> = Vec::new();

        for term in terms {
            let key = match cache {
                Some(cache) => cache.get_or_normalize(FREQUENCY_ANALYZER, term, |t| {
                    self.normalize_term(t, FREQUENCY_ANALYZER)
                })?,
                None => self.normalize_term(term, FREQUENCY_ANALYZER)?,
            };
            if !key.is_empty() && seen.insert(key.clone()) {
                keys.push(key.clone());
            }
            result.normalized.insert(term.clone(), key);
        }

        let batch_size = self.ttf_batch_size().max(1);
        for batch in keys.chunks(batch_size) {
            let frequencies = self.term_frequency_request(field, batch)?;
            result.ttf.extend(frequencies);
        }
        debug!(
            "ttf query: {} terms, {} keys, {} requests",
            terms.len(),
            keys.len(),
            keys.len().div_ceil(batch_size)
        );
        Ok(result)
    }
}

/// Opens independent store handles, one per worker.
pub trait StoreConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn CorpusStore>>;
}
