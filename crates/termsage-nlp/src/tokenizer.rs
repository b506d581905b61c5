//! Regex tokenizer for irregular industrial text.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
          (?:[A-Z]\.)+                        # abbreviations, U.S.A.
        | \$?\d+(?:\.\d+)?%?[a-zA-Z0-9]*      # currency, percentages, 3rd, 12mm
        | \w+(?:-\w+)*                        # words with internal hyphens
        | '[sS]\b                             # possessive
        | \.\.\.                              # ellipsis
        | [\]\[.,;"'?!():*\-_/\\@&$\x{2018}\x{2019}\x{201C}\x{201D}`]
        "#,
    )
    .unwrap()
});

/// Split a sentence into tokens. Whitespace and unmatched characters are
/// discarded.
pub fn tokenize(sentence: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(sentence)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_tokens() {
        assert_eq!(
            tokenize("The U.S.A. plant's $12.40 cost rose 50% on wal-mart's 3rd line..."),
            vec![
                "The", "U.S.A.", "plant", "'s", "$12.40", "cost", "rose", "50%", "on",
                "wal-mart", "'s", "3rd", "line", "..."
            ]
        );
    }

    #[test]
    fn test_punctuation_split() {
        assert_eq!(
            tokenize("rail (north), \"worn\" / bent"),
            vec!["rail", "(", "north", ")", ",", "\"", "worn", "\"", "/", "bent"]
        );
    }
}
