//! Run and stage reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Tagging,
    Ranking,
    Cutoff,
    Finalization,
    VariantAggregation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tagging => "tagging",
            Self::Ranking => "ranking",
            Self::Cutoff => "cutoff",
            Self::Finalization => "finalization",
            Self::VariantAggregation => "variant_aggregation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Documents, candidates or groups handled, depending on the stage.
    pub items: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub documents_total: usize,
    pub candidates: usize,
    pub ranked: usize,
    pub accepted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_groups: Option<usize>,
    pub stages: Vec<StageReport>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            documents_total: 0,
            candidates: 0,
            ranked: 0,
            accepted: 0,
            variant_groups: None,
            stages: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-stage document tally of a paged pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PageTally {
    pub updated: usize,
    pub failed: usize,
}
