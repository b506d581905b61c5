//! Run-scoped cache of normalized terms.
//!
//! Created once per pipeline run and passed by reference into the ranking
//! and tagging components, so repeated normalization of the same surface
//! form hits the store only once.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;

/// Thread-safe `(analyzer, term) → normalized` map.
#[derive(Default)]
pub struct NormalizationCache {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl NormalizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, analyzer: &str, term: &str) -> Option<String> {
        self.entries
            .read()
            .get(&(analyzer.to_string(), term.to_string()))
            .cloned()
    }

    pub fn put(&self, analyzer: &str, term: &str, normalized: String) {
        self.entries
            .write()
            .insert((analyzer.to_string(), term.to_string()), normalized);
    }

    /// Return the cached value or compute, store and return it.
    /// Errors from `normalize` are passed through and nothing is cached.
    pub fn get_or_normalize<F>(&self, analyzer: &str, term: &str, normalize: F) -> Result<String>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        if let Some(hit) = self.get(analyzer, term) {
            return Ok(hit);
        }
        let normalized = normalize(term)?;
        self.put(analyzer, term, normalized.clone());
        Ok(normalized)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
