//! C-value ranking.
//!
//! For a candidate `t` with `a` normalized tokens and corpus frequency
//! `f(t)`, and `L(t)` the candidates nesting it:
//!
//! ```text
//! C(t) = log2(a) * f(t)                          if L(t) is empty
//! C(t) = log2(a) * (f(t) - sum_fb / |L(t)|)      otherwise
//! ```
//!
//! where `sum_fb` sums the frequencies of the members of `L(t)`.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use termsage_core::{Error, NormalizationCache, Result, TaskPool};
use termsage_store::{CorpusStore, Field, StoreConnector, FREQUENCY_ANALYZER};

/// A ranked term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// A candidate with its normalized key and token set.
#[derive(Debug, Clone)]
pub struct NormalizedCandidate {
    pub term: String,
    pub normalized: String,
    tokens: HashSet<String>,
    token_count: usize,
}

impl NormalizedCandidate {
    pub fn new(term: impl Into<String>, normalized: impl Into<String>) -> Self {
        let normalized = normalized.into();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        Self {
            term: term.into(),
            token_count: tokens.len(),
            tokens: tokens.into_iter().map(str::to_string).collect(),
            normalized,
        }
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// True if `other` nests this candidate: its token set is a proper
    /// superset of this one's.
    fn is_nested_in(&self, other: &NormalizedCandidate) -> bool {
        self.term != other.term
            && self.normalized != other.normalized
            && self.tokens.len() < other.tokens.len()
            && self.tokens.is_subset(&other.tokens)
    }
}

/// `L(t)`: every candidate whose normalized token set strictly contains the
/// target's. Never contains the target.
pub fn longer_terms<'a>(
    target: &NormalizedCandidate,
    all: &'a [NormalizedCandidate],
) -> Vec<&'a NormalizedCandidate> {
    all.iter().filter(|c| target.is_nested_in(c)).collect()
}

/// The C-value of a term with `token_count` tokens, frequency `freq` and the
/// frequencies of its nesting terms.
pub fn cvalue(token_count: usize, freq: u64, nested_freqs: &[u64]) -> f64 {
    let log2a = (token_count as f64).log2();
    if nested_freqs.is_empty() {
        return log2a * freq as f64;
    }
    let p = nested_freqs.len() as f64;
    let sum_fb: u64 = nested_freqs.iter().sum();
    log2a * (freq as f64 - sum_fb as f64 / p)
}

/// Descending by score, then ascending by term.
pub fn sort_ranked(ranked: &mut [TermScore]) {
    ranked.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.term.cmp(&b.term),
        other => other,
    });
}

/// Terms scoring strictly above `threshold`, in ranked order.
pub fn apply_cutoff(ranked: &[TermScore], threshold: f64) -> Vec<TermScore> {
    ranked
        .iter()
        .filter(|t| t.score > threshold)
        .cloned()
        .collect()
}

/// Parallel C-value ranker. Each worker job opens its own store handle
/// through the connector.
pub struct CValueRanker<'a> {
    connector: &'a dyn StoreConnector,
    pool: &'a TaskPool,
    cache: &'a NormalizationCache,
}

impl<'a> CValueRanker<'a> {
    pub fn new(
        connector: &'a dyn StoreConnector,
        pool: &'a TaskPool,
        cache: &'a NormalizationCache,
    ) -> Self {
        Self {
            connector,
            pool,
            cache,
        }
    }

    /// Normalize every candidate. Candidates that fail normalization or
    /// normalize to nothing are logged and dropped.
    pub fn normalize_all(
        &self,
        store: &dyn CorpusStore,
        candidates: &[String],
    ) -> Vec<NormalizedCandidate> {
        let mut normalized = Vec::with_capacity(candidates.len());
        for term in candidates {
            let key = self.cache.get_or_normalize(FREQUENCY_ANALYZER, term, |t| {
                store.normalize_term(t, FREQUENCY_ANALYZER)
            });
            match key {
                Ok(key) if key.is_empty() => {
                    let issue = Error::DataQuality(format!("candidate '{}' normalizes to nothing", term));
                    warn!("{}", issue);
                }
                Ok(key) => normalized.push(NormalizedCandidate::new(term.clone(), key)),
                Err(e) => error!("Dropping candidate '{}': {}", term, e),
            }
        }
        normalized
    }

    /// Score every candidate and return them in ranked order.
    pub fn rank(&self, candidates: &[String]) -> Result<Vec<TermScore>> {
        info!(
            "C-value ranking of {} candidates with {} workers",
            candidates.len(),
            self.pool.workers()
        );
        let controller = self.connector.connect()?;
        let snapshot = self.normalize_all(controller.as_ref(), candidates);
        let snapshot = snapshot.as_slice();

        let indices: Vec<usize> = (0..snapshot.len()).collect();
        let results = self.pool.map_with_init(
            indices,
            || self.connector.connect(),
            |conn, idx| {
                let store = conn
                    .as_ref()
                    .map_err(|e| Error::corpus(format!("worker connection: {}", e)))?;
                self.score(&**store, &snapshot[idx], snapshot)
            },
        );

        let mut ranked = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (candidate, result) in snapshot.iter().zip(results) {
            match result {
                Ok(score) => ranked.push(score),
                Err(e) => {
                    error!("Scoring failed for '{}': {}", candidate.term, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if ranked.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        sort_ranked(&mut ranked);
        info!("C-value ranking complete: {} terms ranked", ranked.len());
        Ok(ranked)
    }

    fn score(
        &self,
        store: &dyn CorpusStore,
        target: &NormalizedCandidate,
        snapshot: &[NormalizedCandidate],
    ) -> Result<TermScore> {
        let longer = longer_terms(target, snapshot);
        let mut terms = Vec::with_capacity(longer.len() + 1);
        terms.push(target.term.clone());
        terms.extend(longer.iter().map(|c| c.term.clone()));

        let frequencies =
            store.total_term_frequency_cached(Field::Content, &terms, Some(self.cache))?;
        let freq = frequencies.frequency_of(&target.term).unwrap_or(0);
        let nested: Vec<u64> = longer
            .iter()
            .map(|c| frequencies.frequency_of(&c.term).unwrap_or(0))
            .collect();

        let score = cvalue(target.token_count(), freq, &nested);
        debug!(
            "cvalue('{}') = {:.3} (a={}, f={}, P={})",
            target.term,
            score,
            target.token_count(),
            freq,
            nested.len()
        );
        Ok(TermScore {
            term: target.term.clone(),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termsage_store::{SqliteCorpusStore, StoreOptions};

    fn candidate(term: &str) -> NormalizedCandidate {
        NormalizedCandidate::new(term, term.to_lowercase())
    }

    #[test]
    fn test_cvalue_formula() {
        // No nesting terms
        assert_eq!(cvalue(2, 5, &[]), 5.0);
        assert_eq!(cvalue(4, 3, &[]), 6.0);
        // Single-token terms always score zero
        assert_eq!(cvalue(1, 20, &[5]), 0.0);
        // log2(2) * (10 - (4 + 8) / 2)
        assert_eq!(cvalue(2, 10, &[4, 8]), 4.0);
    }

    #[test]
    fn test_nesting_discount_shrinks_with_larger_nested_frequency() {
        let lone = cvalue(2, 10, &[]);
        let nested = cvalue(2, 10, &[2]);
        let heavily_nested = cvalue(2, 10, &[8]);
        assert!(lone > nested);
        assert!(nested > heavily_nested);
    }

    #[test]
    fn test_longer_terms_excludes_self_and_equal_keys() {
        let all = vec![
            candidate("cut"),
            candidate("bad cut"),
            candidate("Cut"),
            candidate("very bad cut"),
            candidate("weld"),
        ];
        let longer: Vec<&str> = longer_terms(&all[0], &all)
            .iter()
            .map(|c| c.term.as_str())
            .collect();
        assert_eq!(longer, vec!["bad cut", "very bad cut"]);
        assert!(longer_terms(&all[3], &all).is_empty());
    }

    #[test]
    fn test_equal_token_sets_do_not_nest() {
        let all = vec![
            candidate("cut"),
            candidate("cut cut"),
            candidate("bad cut"),
            candidate("cut bad"),
        ];
        let terms = |target: &NormalizedCandidate| -> Vec<String> {
            longer_terms(target, &all)
                .iter()
                .map(|c| c.term.clone())
                .collect()
        };
        // Repeated tokens collapse to the same set as the shorter term
        assert_eq!(terms(&all[0]), vec!["bad cut", "cut bad"]);
        assert_eq!(terms(&all[1]), vec!["bad cut", "cut bad"]);
        // Permutations have equal sets
        assert!(terms(&all[2]).is_empty());
        assert!(terms(&all[3]).is_empty());
    }

    #[test]
    fn test_discount_spread_over_more_nesting_terms_is_smaller() {
        // sum_fb fixed at 6 while P grows: the mean subtracted shrinks
        let one = cvalue(2, 10, &[6]);
        let two = cvalue(2, 10, &[3, 3]);
        let three = cvalue(2, 10, &[2, 2, 2]);
        assert_eq!((one, two, three), (4.0, 7.0, 8.0));
        assert!(one < two && two < three);
    }

    #[test]
    fn test_sort_and_cutoff() {
        let mut ranked = vec![
            TermScore { term: "b".into(), score: 1.0 },
            TermScore { term: "c".into(), score: -150.0 },
            TermScore { term: "a".into(), score: 1.0 },
            TermScore { term: "d".into(), score: 7.5 },
        ];
        sort_ranked(&mut ranked);
        let order: Vec<&str> = ranked.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);

        let accepted = apply_cutoff(&ranked, -100.0);
        assert_eq!(accepted.len(), 3);
        assert!(apply_cutoff(&ranked, 7.5).is_empty());
    }

    #[test]
    fn test_rank_against_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCorpusStore::open(dir.path(), StoreOptions::default()).unwrap();
        for i in 0..5 {
            store
                .add_document(&format!("b{}", i), &format!("bad cut {}", i))
                .unwrap();
        }
        for i in 0..15 {
            store
                .add_document(&format!("c{}", i), &format!("cut {}", i))
                .unwrap();
        }

        let connector = store.connector();
        let pool = TaskPool::new(2).unwrap();
        let cache = NormalizationCache::new();
        let ranker = CValueRanker::new(&connector, &pool, &cache);

        let ranked = ranker
            .rank(&["cut".to_string(), "bad cut".to_string()])
            .unwrap();
        assert_eq!(
            ranked,
            vec![
                TermScore { term: "bad cut".into(), score: 5.0 },
                TermScore { term: "cut".into(), score: 0.0 },
            ]
        );
        assert_eq!(cache.get(FREQUENCY_ANALYZER, "bad cut").as_deref(), Some("bad cut"));
        assert_eq!(apply_cutoff(&ranked, -100.0).len(), 2);
    }

    #[test]
    fn test_unnormalizable_candidate_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCorpusStore::open(dir.path(), StoreOptions::default()).unwrap();
        store.add_document("1", "rail head").unwrap();

        let connector = store.connector();
        let pool = TaskPool::new(1).unwrap();
        let cache = NormalizationCache::new();
        let ranker = CValueRanker::new(&connector, &pool, &cache);

        let ranked = ranker
            .rank(&["--".to_string(), "rail head".to_string()])
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].term, "rail head");
        assert_eq!(ranked[0].score, 1.0);
    }
}
