//! termsage-runtime: the five-stage terminology pipeline and its outputs.

pub mod export;
pub mod orchestrator;
pub mod types;
pub mod variants;

pub use orchestrator::{final_terms, Pipeline};
pub use types::{RunReport, Stage, StageReport};
