//! Exact-then-fuzzy dictionary tagging of indexed document terms.

use std::collections::BTreeSet;

use tracing::debug;

use termsage_core::{PipelineConfig, Result, TaskPool};
use termsage_store::CorpusStore;

use crate::dictionary::Dictionary;
use crate::trie::{levenshtein, Trie};

/// `1 - distance / max(len)` over characters; two empty strings are
/// identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

#[derive(Debug, Clone)]
pub struct DictionaryTagger {
    dictionary: Dictionary,
    trie: Trie,
    fuzzy: bool,
    sim_threshold: f64,
    max_edit_distance: usize,
}

impl DictionaryTagger {
    /// Build the trie once; it is read-only afterwards.
    pub fn new(
        dictionary: Dictionary,
        fuzzy: bool,
        sim_threshold: f64,
        max_edit_distance: usize,
    ) -> Self {
        let mut trie = Trie::new();
        for term in dictionary.terms() {
            trie.insert(term);
        }
        debug!(
            "Dictionary trie built: {} words, {} nodes",
            trie.len(),
            trie.node_count()
        );
        Self {
            dictionary,
            trie,
            fuzzy,
            sim_threshold,
            max_edit_distance,
        }
    }

    pub fn from_config(config: &PipelineConfig, dictionary: Dictionary) -> Self {
        Self::new(
            dictionary,
            config.dict_fuzzy_matching,
            config.dict_sim_threshold,
            config.dict_max_edit_distance,
        )
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Accept an exact dictionary match, or with fuzzy matching enabled any
    /// entry within the edit bound whose similarity reaches the threshold.
    pub fn accept(&self, term: &str) -> bool {
        if self.dictionary.contains(term) {
            return true;
        }
        self.fuzzy
            && self
                .trie
                .search(term, self.max_edit_distance)
                .iter()
                .any(|(entry, _)| similarity(term, entry) >= self.sim_threshold)
    }

    /// Accepted subset of `terms`. Each term is tested independently on the
    /// pool.
    pub fn tag_terms(&self, pool: &TaskPool, terms: Vec<String>) -> BTreeSet<String> {
        pool.map(terms, |term| self.accept(&term).then_some(term))
            .into_iter()
            .flatten()
            .collect()
    }

    /// Dictionary tags of one document, from its indexed content terms.
    pub fn tag_document(
        &self,
        store: &dyn CorpusStore,
        pool: &TaskPool,
        doc_id: &str,
    ) -> Result<BTreeSet<String>> {
        let indexed: Vec<String> = store.indexed_terms(doc_id)?.into_keys().collect();
        let tagged = self.tag_terms(pool, indexed);
        debug!("Document {}: {} dictionary terms", doc_id, tagged.len());
        Ok(tagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termsage_store::{SqliteCorpusStore, StoreOptions};

    fn tagger(fuzzy: bool, threshold: f64) -> DictionaryTagger {
        DictionaryTagger::new(
            Dictionary::from_terms(["surface defect", "web void", "rail head"]),
            fuzzy,
            threshold,
            3,
        )
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert!((similarity("web void", "web voids") - (1.0 - 1.0 / 9.0)).abs() < 1e-12);
    }

    #[test]
    fn test_exact_match_without_fuzzy() {
        let t = tagger(false, 0.95);
        assert!(t.accept("web void"));
        assert!(!t.accept("web voids"));
    }

    #[test]
    fn test_fuzzy_threshold() {
        // 1 edit over 15 chars = 0.933
        assert!(!tagger(true, 0.95).accept("surface defectx"));
        assert!(tagger(true, 0.9).accept("surface defectx"));
        // Beyond the edit bound no entry is reached, whatever the threshold
        assert!(!tagger(true, 0.0).accept("rail"));
    }

    #[test]
    fn test_tag_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCorpusStore::open(dir.path(), StoreOptions::default()).unwrap();
        store
            .add_document("1", "A web void near the rail head was logged.")
            .unwrap();
        let pool = TaskPool::new(2).unwrap();

        let tags = tagger(false, 0.95).tag_document(&store, &pool, "1").unwrap();
        let expected: BTreeSet<String> =
            ["rail head", "web void"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tags, expected);
    }
}
