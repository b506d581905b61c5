//! Surface-variant grouping of accepted terms.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use termsage_core::{NormalizationCache, Result};
use termsage_store::{Analyzer, CorpusStore};

/// Group terms sharing a normalization key. Groups are ordered by key and
/// members sorted. A term that fails normalization is logged and left out.
pub fn group_variants(
    store: &dyn CorpusStore,
    terms: &BTreeSet<String>,
    analyzer: &str,
    cache: &NormalizationCache,
) -> Result<Vec<Vec<String>>> {
    // Unknown analyzer names fail the stage rather than every term
    Analyzer::from_name(analyzer)?;

    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for term in terms {
        match cache.get_or_normalize(analyzer, term, |t| store.normalize_term(t, analyzer)) {
            Ok(key) => {
                groups.entry(key).or_default().insert(term.clone());
            }
            Err(e) => warn!("Variant key failed for '{}': {}", term, e),
        }
    }
    debug!("{} terms in {} variant groups", terms.len(), groups.len());
    Ok(groups
        .into_values()
        .map(|members| members.into_iter().collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termsage_store::{SqliteCorpusStore, StoreOptions};

    #[test]
    fn test_groups_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCorpusStore::open(dir.path(), StoreOptions::default()).unwrap();
        let cache = NormalizationCache::new();
        let terms: BTreeSet<String> = ["Surface Defect", "surface defects", "web void", "Web-Void"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let groups = group_variants(&store, &terms, "content", &cache).unwrap();
        assert_eq!(
            groups,
            vec![
                vec!["Surface Defect".to_string(), "surface defects".to_string()],
                vec!["Web-Void".to_string(), "web void".to_string()],
            ]
        );

        let keyword = group_variants(&store, &terms, "keyword", &cache).unwrap();
        assert_eq!(keyword.len(), 3);
        assert!(group_variants(&store, &terms, "phonetic", &cache).is_err());
    }
}
