//! Candidate filters: linguistic first, then corpus frequency.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use termsage_core::{Error, NormalizationCache, PipelineConfig, Result};
use termsage_store::{CorpusStore, Field};

use crate::stopwords::Stopwords;

/// Stopword, token-count and token-length filtering.
#[derive(Debug, Clone)]
pub struct LinguisticFilter {
    stopwords: Stopwords,
    min_tokens: usize,
    max_tokens: usize,
    min_char_length: usize,
}

impl LinguisticFilter {
    pub fn new(
        stopwords: Stopwords,
        min_tokens: usize,
        max_tokens: usize,
        min_char_length: usize,
    ) -> Self {
        Self {
            stopwords,
            min_tokens,
            max_tokens,
            min_char_length,
        }
    }

    pub fn from_config(config: &PipelineConfig, stopwords: Stopwords) -> Self {
        Self::new(
            stopwords,
            config.min_tokens,
            config.max_tokens,
            config.min_char_length,
        )
    }

    /// Tokens of up to two characters are matched as written so that
    /// acronyms like `IT` or `US` survive.
    fn is_stopword(&self, token: &str) -> bool {
        if token.chars().count() > 2 {
            self.stopwords.contains(&token.to_lowercase())
        } else {
            self.stopwords.contains(token)
        }
    }

    pub fn apply(&self, candidates: &BTreeSet<String>) -> BTreeSet<String> {
        let mut kept = BTreeSet::new();
        for candidate in candidates {
            let tokens: Vec<&str> = candidate.split_whitespace().collect();
            let stops: Vec<bool> = tokens.iter().map(|t| self.is_stopword(t)).collect();
            if !stops.contains(&true) {
                kept.insert(candidate.clone());
            } else if tokens.len() > 1 && stops[0] && !stops[1..].contains(&true) {
                // Rejected only for its leading word
                kept.insert(tokens[1..].join(" "));
            }
        }

        kept.retain(|c| {
            let n = c.split_whitespace().count();
            n >= self.min_tokens && n <= self.max_tokens
        });
        if self.min_char_length > 1 {
            kept.retain(|c| {
                c.split_whitespace()
                    .all(|t| t.chars().count() >= self.min_char_length)
            });
        }
        kept.retain(|c| !c.is_empty());

        debug!(
            "Linguistic filtering: {} -> {} candidates (stopwords={})",
            candidates.len(),
            kept.len(),
            self.stopwords.len()
        );
        kept
    }
}

/// Keeps candidates whose corpus-wide ttf exceeds `min_term_freq`.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyFilter {
    min_term_freq: u64,
}

impl FrequencyFilter {
    pub fn new(min_term_freq: u64) -> Self {
        Self { min_term_freq }
    }

    /// A threshold of 1 or less disables the filter.
    pub fn is_enabled(&self) -> bool {
        self.min_term_freq > 1
    }

    pub fn apply(
        &self,
        store: &dyn CorpusStore,
        candidates: &BTreeSet<String>,
        cache: Option<&NormalizationCache>,
    ) -> Result<BTreeSet<String>> {
        if !self.is_enabled() || candidates.is_empty() {
            return Ok(candidates.clone());
        }

        let terms: Vec<String> = candidates.iter().cloned().collect();
        let frequencies = store.total_term_frequency_cached(Field::Content, &terms, cache)?;

        let mut kept = BTreeSet::new();
        for term in terms {
            match frequencies.frequency_of(&term) {
                Some(ttf) if ttf > self.min_term_freq => {
                    kept.insert(term);
                }
                Some(ttf) if ttf > 0 => {}
                _ => warn!(
                    "{}",
                    Error::DataQuality(format!(
                        "term '{}' has no ttf value; check tokenization or the shingle range",
                        term
                    ))
                ),
            }
        }
        debug!(
            "Frequency filtering (min {}): {} -> {} candidates",
            self.min_term_freq,
            candidates.len(),
            kept.len()
        );
        Ok(kept)
    }
}
