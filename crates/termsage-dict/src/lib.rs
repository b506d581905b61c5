//! termsage-dict: curated dictionary loading and trie-bounded fuzzy
//! matching of indexed document terms.

pub mod dictionary;
pub mod tagger;
pub mod trie;

pub use dictionary::Dictionary;
pub use tagger::{similarity, DictionaryTagger};
pub use trie::{levenshtein, Trie};
