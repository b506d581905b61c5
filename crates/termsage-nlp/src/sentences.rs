//! Sentence boundary detection.

/// Lowercased abbreviations whose trailing period never ends a sentence.
const ABBREVIATIONS: &[&str] = &[
    "approx.", "assn.", "co.", "corp.", "dept.", "dr.", "e.g.", "eq.", "est.", "etc.", "fig.",
    "i.e.", "inc.", "jr.", "ltd.", "max.", "min.", "mr.", "mrs.", "ms.", "no.", "nos.", "prof.",
    "ref.", "sr.", "st.", "vol.", "vs.",
];

/// Split text into sentences without lookbehind.
///
/// `.`, `!` or `?` followed by whitespace ends a sentence, unless the
/// period closes a known abbreviation, a single capital initial (`J.`) or a
/// dotted acronym (`U.S.A.`).
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'.' || b == b'!' || b == b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            if b == b'.' && ends_with_abbreviation(&text[start..=i]) {
                continue;
            }
            let s = text[start..=i].trim();
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
            start = i + 1;
        }
    }
    let s = text[start..].trim();
    if !s.is_empty() {
        sentences.push(s.to_string());
    }
    sentences
}

fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(word) = segment.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.len() < 2 {
        return false;
    }
    if ABBREVIATIONS.contains(&word.to_lowercase().as_str()) {
        return true;
    }

    let mut chars = word.chars();
    if let (Some(first), Some('.'), None) = (chars.next(), chars.next(), chars.next()) {
        return first.is_uppercase();
    }

    let body = &word[..word.len() - 1];
    body.contains('.') && body.chars().all(|c| c.is_alphabetic() || c == '.')
}
