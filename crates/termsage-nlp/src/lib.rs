//! termsage-nlp: the linguistic analyzer behind candidate extraction.
//!
//! [`LinguisticAnalyzer`] is the seam: sentence splitting plus
//! tokenize-and-tag into Penn Treebank tags. [`RuleBasedAnalyzer`] is the
//! built-in implementation.

pub mod sentences;
pub mod tagger;
pub mod tokenizer;

pub use tagger::QUOTE_TAG;

/// A token paired with its part-of-speech tag.
pub type TaggedToken = (String, String);

pub trait LinguisticAnalyzer: Send + Sync {
    /// Ordered sentences of a text segment.
    fn sentence_split(&self, text: &str) -> Vec<String>;

    /// Ordered (token, tag) pairs of one sentence.
    fn tokenize_and_tag(&self, sentence: &str) -> Vec<TaggedToken>;
}

/// Regex tokenizer with a lexicon and suffix-rule tagger.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer;

impl RuleBasedAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl LinguisticAnalyzer for RuleBasedAnalyzer {
    fn sentence_split(&self, text: &str) -> Vec<String> {
        sentences::split_sentences(text)
    }

    fn tokenize_and_tag(&self, sentence: &str) -> Vec<TaggedToken> {
        tagger::tag_tokens(&tokenizer::tokenize(sentence))
    }
}
