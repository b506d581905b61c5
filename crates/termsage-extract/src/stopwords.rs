//! Stopword lists.

use std::collections::HashSet;
use std::path::Path;

use termsage_core::{Error, Result};

/// The standard English list (NLTK corpus).
const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// A set of lowercase stopwords.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn english() -> Self {
        Self::from_list(ENGLISH)
    }

    pub fn from_list(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// English list extended with one word per line from each file. Lines
    /// starting with `#` are ignored.
    pub fn load(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut stopwords = Self::english();
        for path in paths {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read stopword file {}: {}", path.display(), e))
            })?;
            stopwords.words.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_lowercase),
            );
        }
        Ok(stopwords)
    }

    /// Exact membership; callers decide on case folding.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_english() {
        let sw = Stopwords::english();
        assert!(sw.contains("the"));
        assert!(sw.contains("s"));
        assert!(!sw.contains("rail"));
    }

    #[test]
    fn test_load_extends_english() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# plant jargon\nApprox\n\nshift").unwrap();

        let sw = Stopwords::load(&[&path]).unwrap();
        assert!(sw.contains("approx"));
        assert!(sw.contains("shift"));
        assert!(sw.contains("the"));
        assert!(!sw.contains("# plant jargon"));
        assert!(Stopwords::load(&[dir.path().join("missing")]).is_err());
    }
}
