//! Curated dictionary source.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, warn};

use termsage_core::{Error, Result};
use termsage_store::{CorpusStore, FREQUENCY_ANALYZER};

/// Normalized dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    terms: BTreeSet<String>,
}

impl Dictionary {
    /// Entries are used as given; callers normalize.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    /// Load a term list and normalize every entry through the store.
    ///
    /// A `.csv` file contributes the first column of every row after the
    /// header; any other file contributes one term per non-empty line.
    pub fn load(path: &Path, store: &dyn CorpusStore) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read dictionary {}: {}", path.display(), e))
        })?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let raw = if is_csv {
            csv_first_column(&text)
        } else {
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut terms = BTreeSet::new();
        for entry in &raw {
            match store.normalize_term(entry, FREQUENCY_ANALYZER) {
                Ok(key) if !key.is_empty() => {
                    terms.insert(key);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping dictionary entry '{}': {}", entry, e),
            }
        }
        info!(
            "Dictionary loaded from {}: {} entries, {} normalized terms",
            path.display(),
            raw.len(),
            terms.len()
        );
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &BTreeSet<String> {
        &self.terms
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn csv_first_column(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let line = line.trim();
            let field = match line.strip_prefix('"') {
                // Quoted field, `""` escapes a quote
                Some(rest) => {
                    let mut out = String::new();
                    let mut chars = rest.chars().peekable();
                    while let Some(c) = chars.next() {
                        if c == '"' {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                out.push('"');
                            } else {
                                break;
                            }
                        } else {
                            out.push(c);
                        }
                    }
                    out
                }
                None => line.split(',').next().unwrap_or("").to_string(),
            };
            let field = field.trim().to_string();
            (!field.is_empty()).then_some(field)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use termsage_store::{SqliteCorpusStore, StoreOptions};

    #[test]
    fn test_csv_first_column() {
        let rows = csv_first_column("term,source\nweb void,glossary\n\"bloom, cast\",iso\n\n");
        assert_eq!(rows, vec!["web void", "bloom, cast"]);
    }

    #[test]
    fn test_load_normalizes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCorpusStore::open(dir.path().join("db"), StoreOptions::default()).unwrap();

        let plain = dir.path().join("terms.txt");
        std::fs::write(&plain, "Surface Defects\n\nsurface defect\nWeb-Void\n").unwrap();
        let dict = Dictionary::load(&plain, &store).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains(&store.normalize_term("surface defects", "content").unwrap()));
        assert!(dict.contains("web void"));

        let csv = dir.path().join("terms.csv");
        std::fs::write(&csv, "term,weight\nrail head,1\n").unwrap();
        let dict = Dictionary::load(&csv, &store).unwrap();
        assert_eq!(dict.terms().iter().collect::<Vec<_>>(), vec!["rail head"]);

        assert!(matches!(
            Dictionary::load(&dir.path().join("none.txt"), &store),
            Err(Error::Config(_))
        ));
    }
}
