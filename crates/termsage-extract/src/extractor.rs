//! Grammar-based candidate extraction for a single document.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use termsage_nlp::LinguisticAnalyzer;

use crate::chunker::reconstruct_span;
use crate::grammar::Grammar;

/// Hard segment boundaries applied before sentence detection.
static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t]").unwrap());

pub struct CandidateExtractor {
    analyzer: Arc<dyn LinguisticAnalyzer>,
    grammar: Grammar,
}

impl CandidateExtractor {
    pub fn new(analyzer: Arc<dyn LinguisticAnalyzer>, grammar: Grammar) -> Self {
        Self { analyzer, grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Split content into sentences: hard line/tab boundaries first, then
    /// sentence detection within each non-empty segment.
    pub fn sentences(&self, content: &str) -> Vec<String> {
        SEGMENT_RE
            .split(content.trim())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .flat_map(|segment| self.analyzer.sentence_split(segment))
            .collect()
    }

    /// Every distinct span matched by any rule in any sentence.
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        let mut candidates = BTreeSet::new();
        for sentence in self.sentences(content) {
            let tagged = self.analyzer.tokenize_and_tag(&sentence);
            if tagged.is_empty() {
                continue;
            }
            let tags: Vec<&str> = tagged.iter().map(|(_, tag)| tag.as_str()).collect();
            for rule in self.grammar.rules() {
                for range in rule.find_spans(&tags) {
                    let term = reconstruct_span(&tagged[range]);
                    if !term.is_empty() {
                        candidates.insert(term);
                    }
                }
            }
        }
        debug!("Candidates after PoS filtering: {}", candidates.len());
        candidates
    }
}
