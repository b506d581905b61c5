//! termsage-store: corpus storage, term analysis and frequency queries.

pub mod analysis;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use analysis::Analyzer;
pub use sqlite::{SqliteConnector, SqliteCorpusStore, StoreOptions};
pub use traits::{CorpusStore, StoreConnector, FREQUENCY_ANALYZER};
pub use types::{Document, DocumentPage, Field, StoreStats, TermFrequencies};
