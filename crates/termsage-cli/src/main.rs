//! termsage: terminology discovery over a plain-text corpus.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use termsage_core::PipelineConfig;
use termsage_nlp::RuleBasedAnalyzer;
use termsage_runtime::Pipeline;
use termsage_store::{Analyzer, SqliteCorpusStore, StoreOptions};

mod ingest;

/// Value following `flag` anywhere in `args`.
fn flag_value(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn open_store(config: &PipelineConfig) -> anyhow::Result<SqliteCorpusStore> {
    SqliteCorpusStore::open(&config.store_dir, StoreOptions::from_config(config))
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))
}

fn print_help() {
    println!("termsage: terminology discovery for industrial text");
    println!();
    println!("Usage: termsage <command>");
    println!();
    println!("Commands:");
    println!("  ingest <dir> [--db <dir>]                Add every .txt file in <dir> to the corpus");
    println!("  run [--config <file>] [--db <dir>]       Run the terminology pipeline");
    println!("  normalize <analyzer> <term>              Show the normalized key of a term");
    println!("  help                                     Show this help message");
    println!();
    println!("Settings come from the JSON config file and TERMSAGE_* environment variables.");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_help();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "ingest" => {
            if args.len() < 3 {
                eprintln!("Usage: termsage ingest <dir> [--db <dir>]");
                std::process::exit(1);
            }
            let source = PathBuf::from(&args[2]);
            // Only the store settings matter here; tagging inputs are not required
            let mut config = PipelineConfig::default();
            config.apply_env(|k| std::env::var(k).ok())?;
            if let Some(db) = flag_value(&args, "--db") {
                config.store_dir = db;
            }
            let store = open_store(&config)?;
            let report = ingest::ingest_dir(&store, &source)?;
            ingest::print_report(&report);
            let stats = store.stats()?;
            println!(
                "Corpus:     {} documents, {} indexed terms ({})",
                stats.total_documents, stats.distinct_content_terms, stats.db_path
            );
            std::process::exit(if report.errors.is_empty() { 0 } else { 1 });
        }
        "run" => {
            let config_path = flag_value(&args, "--config");
            let mut config = PipelineConfig::load(config_path.as_deref())?;
            if let Some(db) = flag_value(&args, "--db") {
                config.store_dir = db;
            }
            info!("Store directory: {}", config.store_dir.display());

            let store = open_store(&config)?;
            let connector = store.connector();
            let pipeline = Pipeline::new(config, &store, &connector, Arc::new(RuleBasedAnalyzer))?;
            let report = pipeline.run()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "normalize" => {
            if args.len() < 4 {
                eprintln!("Usage: termsage normalize <analyzer> <term>");
                std::process::exit(1);
            }
            let analyzer = Analyzer::from_name(&args[2])?;
            println!("{}", analyzer.normalize(&args[3..].join(" ")));
        }
        "--help" | "-h" | "help" => print_help(),
        other => {
            eprintln!("Unknown command: {}. Use 'termsage help' for usage.", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
