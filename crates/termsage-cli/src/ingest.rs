//! Plain-text corpus ingestion.

use std::path::Path;

use tracing::{info, warn};

use termsage_store::SqliteCorpusStore;

#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: usize,
    pub added: usize,
    pub duplicates: usize,
    pub errors: Vec<String>,
}

/// Add every `.txt` file directly under `dir` as a document, in file name
/// order. The document id is the file name.
pub fn ingest_dir(store: &SqliteCorpusStore, dir: &Path) -> anyhow::Result<IngestReport> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut report = IngestReport::default();
    for path in paths {
        report.files += 1;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                report.errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };
        match store.add_document(&id, &content) {
            Ok(true) => report.added += 1,
            Ok(false) => report.duplicates += 1,
            Err(e) => report.errors.push(format!("{}: {}", id, e)),
        }
    }
    info!(
        "Ingested {}: {} files, {} added, {} duplicates, {} errors",
        dir.display(),
        report.files,
        report.added,
        report.duplicates,
        report.errors.len()
    );
    Ok(report)
}

pub fn print_report(report: &IngestReport) {
    println!("Files:      {}", report.files);
    println!("Added:      {}", report.added);
    println!("Duplicates: {}", report.duplicates);
    if !report.errors.is_empty() {
        println!("Errors:");
        for e in &report.errors {
            println!("  {}", e);
        }
    }
}
