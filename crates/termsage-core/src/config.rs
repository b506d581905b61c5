//! Run configuration, resolved once per run.
//!
//! Every option has a documented default. `PipelineConfig::load` reads an
//! optional JSON file, applies `TERMSAGE_*` environment overrides and
//! validates the result; downstream components only ever see the immutable
//! record.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_MIN_TOKENS: usize = 1;
pub const DEFAULT_MAX_TOKENS: usize = 6;
pub const DEFAULT_MIN_CHAR_LENGTH: usize = 2;
pub const DEFAULT_MIN_TERM_FREQ: u64 = 1;
pub const DEFAULT_TTF_BATCH_SIZE: usize = 10;
pub const DEFAULT_CUTOFF_THRESHOLD: f64 = -100.0;
pub const DEFAULT_SIM_THRESHOLD: f64 = 0.95;
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 3;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_SHINGLE_SIZE: usize = 6;

/// Top-level terminology pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Worker pool size for C-value scoring and fuzzy dictionary matching.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Inclusive token-count range for candidates.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Minimum per-token character length. Values ≤1 disable the check.
    #[serde(default = "default_min_char_length")]
    pub min_char_length: usize,
    /// Candidates must occur strictly more often than this. ≤1 disables the filter.
    #[serde(default = "default_min_term_freq")]
    pub min_term_freq: u64,
    /// Terms per total-term-frequency request.
    #[serde(default = "default_ttf_batch_size")]
    pub ttf_batch_size: usize,
    /// Ranked terms with a score strictly above this are accepted.
    #[serde(default = "default_cutoff_threshold")]
    pub cutoff_threshold: f64,
    /// Run candidate extraction (stage 1). Disable to re-rank a tagged corpus.
    #[serde(default = "default_true")]
    pub run_tagging: bool,
    /// Documents per page when iterating the corpus.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub dict_tagging: bool,
    #[serde(default)]
    pub dict_fuzzy_matching: bool,
    #[serde(default = "default_sim_threshold")]
    pub dict_sim_threshold: f64,
    #[serde(default = "default_max_edit_distance")]
    pub dict_max_edit_distance: usize,
    /// Union a document's dictionary tags into its final terms.
    #[serde(default = "default_true")]
    pub index_dict_terms_with_final_terms: bool,

    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,
    #[serde(default)]
    pub grammar_path: Option<PathBuf>,
    #[serde(default)]
    pub stopword_paths: Vec<PathBuf>,

    #[serde(default)]
    pub export_term_candidates: bool,
    #[serde(default)]
    pub export_term_variants: bool,
    /// Analyzer used to group surface variants in stage 5.
    #[serde(default = "default_variant_analyzer")]
    pub variant_analyzer: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Corpus store directory (`<store_dir>/corpus.db`).
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    #[serde(default = "default_store_max_retries")]
    pub store_max_retries: u32,
    #[serde(default = "default_store_busy_timeout_ms")]
    pub store_busy_timeout_ms: u64,
    /// Longest n-gram recorded by the shingle index.
    #[serde(default = "default_shingle_size")]
    pub max_shingle_size: usize,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
fn default_min_tokens() -> usize {
    DEFAULT_MIN_TOKENS
}
fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}
fn default_min_char_length() -> usize {
    DEFAULT_MIN_CHAR_LENGTH
}
fn default_min_term_freq() -> u64 {
    DEFAULT_MIN_TERM_FREQ
}
fn default_ttf_batch_size() -> usize {
    DEFAULT_TTF_BATCH_SIZE
}
fn default_cutoff_threshold() -> f64 {
    DEFAULT_CUTOFF_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_sim_threshold() -> f64 {
    DEFAULT_SIM_THRESHOLD
}
fn default_max_edit_distance() -> usize {
    DEFAULT_MAX_EDIT_DISTANCE
}
fn default_variant_analyzer() -> String {
    "content".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_store_max_retries() -> u32 {
    3
}
fn default_store_busy_timeout_ms() -> u64 {
    5000
}
fn default_shingle_size() -> usize {
    DEFAULT_SHINGLE_SIZE
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            min_tokens: DEFAULT_MIN_TOKENS,
            max_tokens: DEFAULT_MAX_TOKENS,
            min_char_length: DEFAULT_MIN_CHAR_LENGTH,
            min_term_freq: DEFAULT_MIN_TERM_FREQ,
            ttf_batch_size: DEFAULT_TTF_BATCH_SIZE,
            cutoff_threshold: DEFAULT_CUTOFF_THRESHOLD,
            run_tagging: true,
            page_size: DEFAULT_PAGE_SIZE,
            dict_tagging: false,
            dict_fuzzy_matching: false,
            dict_sim_threshold: DEFAULT_SIM_THRESHOLD,
            dict_max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            index_dict_terms_with_final_terms: true,
            dictionary_path: None,
            grammar_path: None,
            stopword_paths: Vec::new(),
            export_term_candidates: false,
            export_term_variants: false,
            variant_analyzer: default_variant_analyzer(),
            output_dir: default_output_dir(),
            store_dir: default_store_dir(),
            store_max_retries: default_store_max_retries(),
            store_busy_timeout_ms: default_store_busy_timeout_ms(),
            max_shingle_size: DEFAULT_SHINGLE_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Resolve configuration from an optional JSON file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                let config: PipelineConfig = serde_json::from_str(&raw)
                    .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TERMSAGE_*` overrides from the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("TERMSAGE_WORKERS") {
            self.workers = parse_env("TERMSAGE_WORKERS", &v)?;
        }
        if let Some(v) = lookup("TERMSAGE_MIN_TERM_FREQ") {
            self.min_term_freq = parse_env("TERMSAGE_MIN_TERM_FREQ", &v)?;
        }
        if let Some(v) = lookup("TERMSAGE_CUTOFF_THRESHOLD") {
            self.cutoff_threshold = parse_env("TERMSAGE_CUTOFF_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("TERMSAGE_GRAMMAR_PATH") {
            self.grammar_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("TERMSAGE_DICTIONARY_PATH") {
            self.dictionary_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("TERMSAGE_STORE_DIR") {
            self.store_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TERMSAGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        if self.min_tokens == 0 || self.min_tokens > self.max_tokens {
            return Err(Error::Config(format!(
                "invalid token range [{}, {}]",
                self.min_tokens, self.max_tokens
            )));
        }
        if self.ttf_batch_size == 0 || self.page_size == 0 {
            return Err(Error::Config(
                "ttf_batch_size and page_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.dict_sim_threshold) {
            return Err(Error::Config(format!(
                "dict_sim_threshold {} outside [0, 1]",
                self.dict_sim_threshold
            )));
        }
        if self.run_tagging && self.grammar_path.is_none() {
            return Err(Error::Config("grammar_path is required for tagging".into()));
        }
        if self.dict_tagging && self.dictionary_path.is_none() {
            return Err(Error::Config(
                "dict_tagging is enabled but dictionary_path is not set".into(),
            ));
        }
        if self.max_shingle_size < self.max_tokens {
            return Err(Error::Config(format!(
                "max_shingle_size {} is shorter than max_tokens {}",
                self.max_shingle_size, self.max_tokens
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_grammar() -> PipelineConfig {
        PipelineConfig {
            grammar_path: Some("grammar.txt".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.cutoff_threshold, -100.0);
        assert_eq!(config.ttf_batch_size, 10);
        assert_eq!(config.dict_max_edit_distance, 3);
        assert!((config.dict_sim_threshold - 0.95).abs() < f64::EPSILON);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"min_term_freq": 3, "grammar_path": "g.txt"}"#).unwrap();
        assert_eq!(config.min_term_freq, 3);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.run_tagging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_grammar_is_fatal() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let rerank_only = PipelineConfig {
            run_tagging: false,
            ..Default::default()
        };
        assert!(rerank_only.validate().is_ok());
    }

    #[test]
    fn test_invalid_ranges() {
        let mut config = with_grammar();
        config.min_tokens = 4;
        config.max_tokens = 2;
        assert!(config.validate().is_err());

        let mut config = with_grammar();
        config.dict_sim_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = with_grammar();
        config.dict_tagging = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = with_grammar();
        config
            .apply_env(|key| match key {
                "TERMSAGE_WORKERS" => Some("3".into()),
                "TERMSAGE_CUTOFF_THRESHOLD" => Some("-5.5".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.cutoff_threshold, -5.5);

        let err = config
            .apply_env(|key| (key == "TERMSAGE_WORKERS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("TERMSAGE_WORKERS"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"grammar_path": "rules.txt", "cutoff_threshold": 1.0, "workers": 2}"#,
        )
        .unwrap();
        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.grammar_path, Some(PathBuf::from("rules.txt")));
        assert_eq!(config.workers, 2);

        let missing = dir.path().join("nope.json");
        assert!(matches!(
            PipelineConfig::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
