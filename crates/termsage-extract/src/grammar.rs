//! Chunk grammar rules over part-of-speech tag sequences.
//!
//! A rule such as `<DT>?<JJ.*>*<NN.*>+` is compiled into a regex over the
//! sentence's tag string `<DT><JJ><NN>`. Inside `<...>` a `.` never crosses
//! a tag boundary, so every match starts and ends on whole tags and maps
//! back to a contiguous token span.

use std::ops::Range;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use termsage_core::{Error, Result};

/// Marker for commented-out rules.
pub const COMMENT_MARKER: char = '#';

/// One compiled chunk rule.
#[derive(Debug, Clone)]
pub struct GrammarRule {
    pattern: String,
    regex: Regex,
}

impl GrammarRule {
    pub fn compile(pattern: &str) -> Result<Self> {
        let mut translated = String::with_capacity(pattern.len() * 2);
        let mut chars = pattern.chars();
        let mut units = 0;

        while let Some(c) = chars.next() {
            match c {
                '<' => {
                    let mut tag = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '>' => {
                                closed = true;
                                break;
                            }
                            '<' => break,
                            '.' => tag.push_str("[^<>]"),
                            c if c.is_whitespace() => {}
                            c => tag.push(c),
                        }
                    }
                    if !closed || tag.is_empty() {
                        return Err(Error::Grammar(format!(
                            "unbalanced or empty tag in rule '{}'",
                            pattern
                        )));
                    }
                    translated.push_str("(?:<(?:");
                    translated.push_str(&tag);
                    translated.push_str(")>)");
                    units += 1;
                }
                '?' | '*' | '+' | '(' | ')' | '|' | '{' | '}' | ',' => translated.push(c),
                c if c.is_ascii_digit() => translated.push(c),
                c if c.is_whitespace() => {}
                other => {
                    return Err(Error::Grammar(format!(
                        "unexpected '{}' outside a tag in rule '{}'",
                        other, pattern
                    )));
                }
            }
        }

        if units == 0 {
            return Err(Error::Grammar(format!("rule '{}' has no tags", pattern)));
        }
        let regex = Regex::new(&translated)
            .map_err(|e| Error::Grammar(format!("rule '{}': {}", pattern, e)))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Token ranges matched in a tag sequence: leftmost, greedy and
    /// non-overlapping. Empty matches are ignored.
    ///
    /// Angle brackets inside a tag are removed so that every token owns
    /// exactly one `<` of the tag string.
    pub fn find_spans<S: AsRef<str>>(&self, tags: &[S]) -> Vec<Range<usize>> {
        let tag_string: String = tags
            .iter()
            .map(|t| format!("<{}>", t.as_ref().replace(['<', '>'], "")))
            .collect();

        self.regex
            .find_iter(&tag_string)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| {
                let start = tag_string[..m.start()].matches('<').count();
                let len = m.as_str().matches('<').count();
                start..start + len
            })
            .collect()
    }
}

/// An ordered set of rules.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: Vec<GrammarRule>,
}

impl Grammar {
    /// Parse a rule file body. Blank and comment lines are skipped; a
    /// malformed rule is logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            match GrammarRule::compile(line) {
                Ok(rule) => rules.push(rule),
                Err(e) => warn!("Skipping grammar rule: {}", e),
            }
        }
        debug!("Loaded {} grammar rules", rules.len());
        Self { rules }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read grammar file {}: {}", path.display(), e))
        })?;
        let grammar = Self::parse(&text);
        if grammar.is_empty() {
            return Err(Error::Config(format!(
                "grammar file {} contains no usable rules",
                path.display()
            )));
        }
        Ok(grammar)
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noun_phrase_rule() {
        let rule = GrammarRule::compile("<DT>?<JJ.*>*<NN.*>+").unwrap();
        let tags = ["DT", "JJ", "NN", "VBD", "IN", "NNS", "NNP", "."];
        assert_eq!(rule.find_spans(&tags), vec![0..3, 5..7]);
    }

    #[test]
    fn test_dot_stays_inside_tag() {
        let rule = GrammarRule::compile("<N.*>").unwrap();
        // `.*` must not swallow the following tags
        assert_eq!(rule.find_spans(&["NN", "JJ", "NNS"]), vec![0..1, 2..3]);
        assert!(rule.find_spans(&["JJ", "VB"]).is_empty());
    }

    #[test]
    fn test_greedy_non_overlapping() {
        let rule = GrammarRule::compile("<NN><NN>").unwrap();
        assert_eq!(rule.find_spans(&["NN", "NN", "NN", "NN", "NN"]), vec![0..2, 2..4]);
        let optional = GrammarRule::compile("<DT>?").unwrap();
        assert_eq!(optional.find_spans(&["NN", "DT"]), vec![1..2]);
    }

    #[test]
    fn test_bracketed_tags_keep_token_alignment() {
        let rule = GrammarRule::compile("<NN.*>+").unwrap();
        let tags = ["<<X>>", "NN", "NNS", "J>J", "NN"];
        let spans = rule.find_spans(&tags);
        assert_eq!(spans, vec![1..3, 4..5]);
        assert!(spans.iter().all(|r| r.end <= tags.len()));
    }

    #[test]
    fn test_malformed_rules() {
        assert!(matches!(
            GrammarRule::compile("<JJ<NN>"),
            Err(Error::Grammar(_))
        ));
        assert!(GrammarRule::compile("NN+").is_err());
        assert!(GrammarRule::compile("<NN>)").is_err());
        assert!(GrammarRule::compile("").is_err());
    }

    #[test]
    fn test_parse_skips_comments_and_bad_rules() {
        let grammar = Grammar::parse(
            "# noun phrases\n<DT>?<JJ.*>*<NN.*>+\n\n#<VB.*>\n<NN\n<NN.*><IN><NN.*>\n",
        );
        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.rules()[1].pattern(), "<NN.*><IN><NN.*>");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Grammar::load(Path::new("/nonexistent/grammar.txt")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
