//! Extraction plus both filters, as applied to each document in the
//! tagging stage.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use termsage_core::{Error, NormalizationCache, PipelineConfig, Result};
use termsage_nlp::LinguisticAnalyzer;
use termsage_store::CorpusStore;

use crate::extractor::CandidateExtractor;
use crate::filter::{FrequencyFilter, LinguisticFilter};
use crate::grammar::Grammar;
use crate::stopwords::Stopwords;

pub struct CandidateTagger {
    extractor: CandidateExtractor,
    linguistic: LinguisticFilter,
    frequency: FrequencyFilter,
}

impl CandidateTagger {
    pub fn new(
        extractor: CandidateExtractor,
        linguistic: LinguisticFilter,
        frequency: FrequencyFilter,
    ) -> Self {
        Self {
            extractor,
            linguistic,
            frequency,
        }
    }

    /// Load the grammar and stopword files named by the config.
    pub fn from_config(
        config: &PipelineConfig,
        analyzer: Arc<dyn LinguisticAnalyzer>,
    ) -> Result<Self> {
        let grammar_path = config
            .grammar_path
            .as_deref()
            .ok_or_else(|| Error::Config("grammar_path is required for tagging".into()))?;
        let grammar = Grammar::load(grammar_path)?;
        let stopwords = Stopwords::load(config.stopword_paths.as_slice())?;
        info!(
            "Candidate tagger ready: {} grammar rules, {} stopwords, min_term_freq={}",
            grammar.len(),
            stopwords.len(),
            config.min_term_freq
        );
        Ok(Self::new(
            CandidateExtractor::new(analyzer, grammar),
            LinguisticFilter::from_config(config, stopwords),
            FrequencyFilter::new(config.min_term_freq),
        ))
    }

    /// Filtered candidates of one document.
    pub fn tag(
        &self,
        content: &str,
        store: &dyn CorpusStore,
        cache: Option<&NormalizationCache>,
    ) -> Result<BTreeSet<String>> {
        let extracted = self.extractor.extract(content);
        let filtered = self.linguistic.apply(&extracted);
        self.frequency.apply(store, &filtered, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use termsage_nlp::RuleBasedAnalyzer;
    use termsage_store::{SqliteCorpusStore, StoreOptions};

    #[test]
    fn test_tag_document() {
        let dir = tempfile::tempdir().unwrap();
        let grammar_path = dir.path().join("grammar.txt");
        let mut f = std::fs::File::create(&grammar_path).unwrap();
        writeln!(f, "# candidate patterns\n<DT>?<JJ.*>*<NN.*>+").unwrap();

        let config = PipelineConfig {
            grammar_path: Some(grammar_path),
            min_term_freq: 1,
            ..Default::default()
        };
        let tagger = CandidateTagger::from_config(&config, Arc::new(RuleBasedAnalyzer)).unwrap();

        let store = SqliteCorpusStore::open(dir.path().join("db"), StoreOptions::default()).unwrap();
        let content = "The bad cut was found.\nThe surface defects widened.";
        store.add_document("1", content).unwrap();

        let tags = tagger.tag(content, &store, None).unwrap();
        assert!(tags.contains("bad cut"));
        assert!(tags.contains("surface defects"));
        assert!(!tags.iter().any(|t| t.to_lowercase().starts_with("the")));
    }

    #[test]
    fn test_missing_grammar_path() {
        let config = PipelineConfig::default();
        let err = CandidateTagger::from_config(&config, Arc::new(RuleBasedAnalyzer)).err();
        assert!(matches!(err, Some(Error::Config(_))));
    }
}
