//! Rule-based Penn Treebank part-of-speech tagger.
//!
//! Closed-class words come from a lexicon; open-class words are tagged by
//! shape (numerals, capitalization) and suffix. Accuracy is modest but
//! stable, which is what grammar-driven candidate extraction needs: nouns,
//! adjectives and determiners have to be told apart from the rest.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Tag assigned to every quote-mark token.
pub const QUOTE_TAG: &str = "''";

static LEXICON: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: &[(&str, &[&str])] = &[
        ("DT", &[
            "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any",
            "no", "all", "both", "either", "neither", "another",
        ]),
        ("IN", &[
            "of", "in", "on", "at", "by", "for", "with", "from", "into", "onto", "over", "under",
            "about", "above", "below", "between", "through", "during", "after", "before",
            "against", "without", "within", "along", "across", "behind", "beyond", "near",
            "since", "until", "upon", "via", "per", "than", "because", "although", "while",
            "if", "whether", "though", "as", "like", "among", "around", "despite", "towards",
        ]),
        ("CC", &["and", "or", "but", "nor", "yet", "plus", "&"]),
        ("PRP", &[
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "itself",
            "themselves", "himself", "herself", "ourselves", "myself",
        ]),
        ("PRP$", &["my", "your", "his", "her", "its", "our", "their"]),
        ("MD", &["can", "could", "may", "might", "must", "shall", "should", "will", "would"]),
        ("TO", &["to"]),
        ("WDT", &["which", "whatever", "whichever"]),
        ("WP", &["who", "whom", "what", "whoever"]),
        ("WP$", &["whose"]),
        ("WRB", &["when", "where", "why", "how", "whenever", "wherever"]),
        ("EX", &["there"]),
        ("RP", &["up", "out", "off", "down"]),
        ("RB", &[
            "not", "very", "also", "too", "often", "always", "never", "again", "already",
            "still", "just", "only", "then", "here", "now", "soon", "almost", "quite", "rather",
            "however", "ever", "even", "away", "together", "n't",
        ]),
        ("VBZ", &["is", "has", "does", "seems", "appears"]),
        ("VBP", &["are", "am", "have", "do"]),
        ("VBD", &["was", "were", "had", "did", "made", "found", "took", "became"]),
        ("VBN", &["been", "done", "seen", "known", "given", "taken", "shown", "worn", "broken"]),
        ("VB", &["be", "make", "get", "use", "take", "see", "replace", "repair", "check"]),
        ("VBG", &["being", "having", "doing"]),
        ("JJ", &[
            "bad", "good", "new", "old", "high", "low", "hot", "cold", "large", "small", "big",
            "long", "short", "wide", "narrow", "heavy", "light", "main", "major", "minor",
            "poor", "clean", "dirty", "full", "empty", "open", "closed", "early", "late",
            "severe", "rough", "smooth", "thin", "thick", "deep", "other", "same", "such",
            "several", "many", "few", "much", "more", "most", "less", "least", "own",
        ]),
        ("CD", &[
            "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            "hundred", "thousand", "million",
        ]),
    ];
    let mut lexicon = HashMap::new();
    for (tag, words) in groups {
        for word in *words {
            lexicon.entry(*word).or_insert(*tag);
        }
    }
    lexicon
});

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "able", "ible", "ical", "ful", "ous", "ive", "less", "ic", "ary", "ish", "ent", "ant",
];

/// Tag a tokenized sentence. The output has one tag per input token.
pub fn tag_tokens(tokens: &[String]) -> Vec<(String, String)> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| (token.clone(), tag_token(token, i == 0).to_string()))
        .collect()
}

fn tag_token(token: &str, sentence_initial: bool) -> &'static str {
    if let Some(tag) = punctuation_tag(token) {
        return tag;
    }
    if token.eq_ignore_ascii_case("'s") {
        return "POS";
    }

    let lower = token.to_lowercase();
    if let Some(tag) = LEXICON.get(lower.as_str()).copied() {
        return tag;
    }

    let first = token.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() || (first == '$' && token.len() > 1) {
        return "CD";
    }
    if token.contains('.') {
        // Dotted acronym
        return "NNP";
    }

    let capitalized = first.is_uppercase();
    let all_caps = token.chars().count() > 1 && token.chars().all(|c| !c.is_lowercase());
    if all_caps || (capitalized && !sentence_initial) {
        return if lower.ends_with('s') && !all_caps && lower.len() > 3 {
            "NNPS"
        } else {
            "NNP"
        };
    }

    suffix_tag(&lower)
}

fn punctuation_tag(token: &str) -> Option<&'static str> {
    let tag = match token {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "..." | "-" | "_" | "*" => ":",
        "(" | "[" => "(",
        ")" | "]" => ")",
        "@" => "@",
        "\\" => "\\",
        "/" => "/",
        "$" => "$",
        "\"" | "'" | "`" | "\u{2018}" | "\u{2019}" | "\u{201C}" | "\u{201D}" => QUOTE_TAG,
        _ => return None,
    };
    Some(tag)
}

fn suffix_tag(lower: &str) -> &'static str {
    let len = lower.chars().count();
    if lower.contains('-') {
        return "JJ";
    }
    if len > 4 && lower.ends_with("ing") {
        return "VBG";
    }
    if len > 3 && lower.ends_with("ed") {
        return "VBD";
    }
    if len > 3 && lower.ends_with("ly") {
        return "RB";
    }
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return "JJ";
    }
    if len > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
    {
        return "NNS";
    }
    "NN"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(sentence: &[&str]) -> Vec<String> {
        let tokens: Vec<String> = sentence.iter().map(|s| s.to_string()).collect();
        tag_tokens(&tokens).into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn test_noun_phrase_tags() {
        assert_eq!(
            tags(&["The", "bad", "cut", "of", "the", "rail", "'s", "surface", "defects", "."]),
            vec!["DT", "JJ", "NN", "IN", "DT", "NN", "POS", "NN", "NNS", "."]
        );
    }

    #[test]
    fn test_shape_rules() {
        assert_eq!(
            tags(&["Crews", "replaced", "12mm", "Sheffield", "bolts", "quickly", "U.S.A."]),
            vec!["NNS", "VBD", "CD", "NNP", "NNS", "RB", "NNP"]
        );
        assert_eq!(tags(&["ABS", "hot-rolled", "welding"]), vec!["NNP", "JJ", "VBG"]);
    }

    #[test]
    fn test_symbols_and_quotes() {
        assert_eq!(
            tags(&["(", ")", "@", "\\", "/", "\"", "\u{201C}"]),
            vec!["(", ")", "@", "\\", "/", "''", "''"]
        );
    }
}
