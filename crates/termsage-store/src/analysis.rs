//! Term analyzers: the canonicalization chain behind `normalize_term`.
//!
//! Both analyzers lowercase, fold diacritics, drop apostrophes and treat
//! every other non-alphanumeric character as a token separator, so
//! `Marc-Anthony`, `Marc Anthony` and `marc anthony` collapse to one key.
//! `content` additionally stems each token (English Snowball).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};

use termsage_core::{Error, Result};

static ENGLISH_STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Named analysis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    /// Case, diacritic and punctuation folding plus stemming. Used for the
    /// content shingle index and every frequency lookup.
    Content,
    /// Folding without stemming.
    Keyword,
}

impl Analyzer {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "content" => Ok(Self::Content),
            "keyword" => Ok(Self::Keyword),
            other => Err(Error::corpus(format!("unknown analyzer '{}'", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Keyword => "keyword",
        }
    }

    /// Analyze text into normalized tokens.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let mut folded = String::with_capacity(text.len());
        for c in text.chars() {
            if c == '\'' || c == '\u{2019}' {
                continue;
            }
            for lower in c.to_lowercase() {
                fold_char(lower, &mut folded);
            }
        }

        folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| match self {
                Self::Content => ENGLISH_STEMMER.stem(t).into_owned(),
                Self::Keyword => t.to_string(),
            })
            .collect()
    }

    /// Analyze text into a single space-joined key.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Count every n-gram of 1..=`max_n` tokens.
pub fn shingles(tokens: &[String], max_n: usize) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for n in 1..=max_n.max(1) {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

fn fold_char(c: char, out: &mut String) {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' | 'ĝ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' | 'ĺ' | 'ļ' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        _ => {
            out.push(c);
            return;
        }
    };
    out.push_str(folded);
}
