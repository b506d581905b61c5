//! termsage-extract: grammar-driven term candidate extraction and the
//! linguistic and frequency filters applied to its output.

pub mod chunker;
pub mod extractor;
pub mod filter;
pub mod grammar;
pub mod stopwords;
pub mod tagging;

pub use extractor::CandidateExtractor;
pub use filter::{FrequencyFilter, LinguisticFilter};
pub use grammar::{Grammar, GrammarRule};
pub use stopwords::Stopwords;
pub use tagging::CandidateTagger;
