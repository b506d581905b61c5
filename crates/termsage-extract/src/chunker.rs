//! Span reconstruction from tagged tokens.

use termsage_nlp::{TaggedToken, QUOTE_TAG};

const DETERMINER: &str = "DT";
const POSSESSIVE: &str = "POS";

/// Rebuild the surface string of a matched span.
///
/// Tokens are joined with single spaces, except that a possessive marker
/// attaches to the previous token, a determiner as the first token is dropped
/// and quote marks are dropped. Any later determiner is kept, even when the
/// dropped one left the output empty.
pub fn reconstruct_span(span: &[TaggedToken]) -> String {
    let mut out = String::new();
    let mut first = true;
    for (token, tag) in span {
        if tag == QUOTE_TAG || token == "\"" {
            continue;
        }
        let leading = std::mem::replace(&mut first, false);
        if tag == POSSESSIVE {
            out.push_str(token);
            continue;
        }
        if leading && tag == DETERMINER {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_leading_determiner_dropped() {
        let s = span(&[("The", "DT"), ("surface", "NN"), ("defect", "NN")]);
        assert_eq!(reconstruct_span(&s), "surface defect");
    }

    #[test]
    fn test_mid_span_determiner_kept() {
        let s = span(&[
            ("ratio", "NN"),
            ("of", "IN"),
            ("the", "DT"),
            ("tensile", "JJ"),
            ("strength", "NN"),
        ]);
        assert_eq!(reconstruct_span(&s), "ratio of the tensile strength");
    }

    #[test]
    fn test_possessive_and_quotes() {
        let s = span(&[
            ("\"", "''"),
            ("operator", "NN"),
            ("'s", "POS"),
            ("\u{201C}", "''"),
            ("log", "NN"),
        ]);
        assert_eq!(reconstruct_span(&s), "operator's log");
    }

    #[test]
    fn test_only_first_of_two_determiners_dropped() {
        let s = span(&[("all", "DT"), ("the", "DT"), ("rails", "NNS")]);
        assert_eq!(reconstruct_span(&s), "the rails");
        // A quote before the determiner does not make it non-leading
        let quoted = span(&[("\"", "''"), ("the", "DT"), ("rails", "NNS")]);
        assert_eq!(reconstruct_span(&quoted), "rails");
    }

    #[test]
    fn test_determiner_only_span_is_empty() {
        assert_eq!(reconstruct_span(&span(&[("the", "DT")])), "");
    }
}
