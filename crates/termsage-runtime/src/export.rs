//! Run outputs: the ranked-candidate database and CSV exports.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use termsage_core::{Error, Result};
use termsage_rank::TermScore;

pub const RANKED_DB_FILE: &str = "term_candidates.db";
pub const RANKED_CSV_FILE: &str = "term_candidates.csv";
pub const VARIANTS_CSV_FILE: &str = "term_variants.csv";

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

/// Replace the contents of `term_candidates` with the ranked list.
pub fn save_ranked_terms(db_path: &Path, ranked: &[TermScore]) -> Result<usize> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(db_path).map_err(db_err)?;
    let tx = conn.transaction().map_err(db_err)?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS term_candidates (
             term_name TEXT PRIMARY KEY,
             weight REAL
         );
         DELETE FROM term_candidates;",
    )
    .map_err(db_err)?;
    let mut inserted = 0;
    {
        let mut stmt = tx
            .prepare("INSERT OR IGNORE INTO term_candidates (term_name, weight) VALUES (?1, ?2)")
            .map_err(db_err)?;
        for term in ranked {
            inserted += stmt
                .execute(params![term.term, term.score])
                .map_err(db_err)?;
        }
    }
    tx.commit().map_err(db_err)?;
    info!("Saved {} ranked candidates to {}", inserted, db_path.display());
    Ok(inserted)
}

/// Write `term,weight` rows in ranked order.
pub fn export_ranked_csv(path: &Path, ranked: &[TermScore]) -> Result<()> {
    let mut out = String::from("term,weight\n");
    for term in ranked {
        out.push_str(&format!("{},{}\n", csv_field(&term.term), term.score));
    }
    write_file(path, &out)?;
    info!("Exported {} ranked terms to {}", ranked.len(), path.display());
    Ok(())
}

/// One variant group per line.
pub fn export_variants_csv(path: &Path, groups: &[Vec<String>]) -> Result<()> {
    let mut out = String::new();
    for group in groups {
        let row: Vec<String> = group.iter().map(|t| csv_field(t)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    write_file(path, &out)?;
    info!("Exported {} variant groups to {}", groups.len(), path.display());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Minimal quoting: fields containing a comma, quote or line break are
/// quoted with inner quotes doubled.
pub fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
