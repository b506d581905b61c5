//! TermSage core: errors, run configuration and run-scoped services.

pub mod cache;
pub mod config;
pub mod error;
pub mod pool;

pub use cache::NormalizationCache;
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pool::TaskPool;
