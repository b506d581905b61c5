//! Data types for documents, pages and term frequency results.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use termsage_core::{Error, Result};

/// A document row from the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    /// Surface-form term candidates extracted in the tagging stage.
    #[serde(default)]
    pub candidates: BTreeSet<String>,
    /// Terms accepted by the dictionary tagger.
    #[serde(default)]
    pub dict_terms: BTreeSet<String>,
    /// Final accepted term annotation.
    #[serde(default)]
    pub final_terms: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// One page of documents plus the corpus-wide document count.
#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub docs: Vec<Document>,
    pub total: usize,
}

/// Indexed document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Raw text, indexed as normalized shingles with frequencies.
    Content,
    TermCandidates,
    DictTerms,
    FinalTerms,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::TermCandidates => "term_candidates",
            Self::DictTerms => "dict_terms",
            Self::FinalTerms => "final_terms",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "content" => Ok(Self::Content),
            "term_candidates" => Ok(Self::TermCandidates),
            "dict_terms" => Ok(Self::DictTerms),
            "final_terms" => Ok(Self::FinalTerms),
            other => Err(Error::corpus(format!("unknown field '{}'", other))),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a total-term-frequency query.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencies {
    /// Normalized term → total term frequency.
    pub ttf: HashMap<String, u64>,
    /// Surface term → normalized term.
    pub normalized: HashMap<String, String>,
}

impl TermFrequencies {
    /// Frequency of a surface term. `None` when the term was not part of
    /// the query or its normalized key is absent from the result.
    pub fn frequency_of(&self, surface: &str) -> Option<u64> {
        self.normalized
            .get(surface)
            .and_then(|key| self.ttf.get(key))
            .copied()
    }
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub distinct_content_terms: usize,
    pub distinct_candidates: usize,
    pub db_path: String,
}
