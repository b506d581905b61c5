//! termsage-rank: C-value term ranking with a nestedness discount.

pub mod cvalue;

pub use cvalue::{apply_cutoff, cvalue, longer_terms, sort_ranked, CValueRanker, TermScore};
