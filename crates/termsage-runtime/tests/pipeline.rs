//! End-to-end runs over a small corpus.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use termsage_core::PipelineConfig;
use termsage_nlp::RuleBasedAnalyzer;
use termsage_runtime::{Pipeline, Stage};
use termsage_store::{CorpusStore, Field, SqliteCorpusStore, StoreOptions};

const CORPUS: &[(&str, &str)] = &[
    ("r1", "The bad cut was found on the rail head."),
    ("r2", "Another bad cut appeared near the web void."),
    ("r3", "Surface defects were logged.\nThe bad cut widened."),
    ("r4", "A web void and surface defects were found."),
];

fn config(root: &Path) -> PipelineConfig {
    let grammar = root.join("grammar.txt");
    std::fs::write(&grammar, "# noun phrases\n<DT>?<JJ.*>*<NN.*>+\n").unwrap();
    PipelineConfig {
        workers: 2,
        page_size: 3,
        grammar_path: Some(grammar),
        store_dir: root.join("data"),
        output_dir: root.join("output"),
        ..Default::default()
    }
}

fn seeded_store(config: &PipelineConfig) -> SqliteCorpusStore {
    let store = SqliteCorpusStore::open(&config.store_dir, StoreOptions::from_config(config)).unwrap();
    for (id, content) in CORPUS {
        store.add_document(id, content).unwrap();
    }
    store
}

fn terms(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.export_term_candidates = true;
    config.export_term_variants = true;
    let store = seeded_store(&config);
    let connector = store.connector();

    let pipeline =
        Pipeline::new(config.clone(), &store, &connector, Arc::new(RuleBasedAnalyzer)).unwrap();
    let report = pipeline.run().unwrap();

    assert_eq!(report.documents_total, 4);
    assert_eq!(report.stage(Stage::Tagging).unwrap().items, 4);
    assert_eq!(report.candidates, 5);
    assert_eq!(report.ranked, 5);
    assert_eq!(report.accepted, 5);
    assert_eq!(report.stage(Stage::Finalization).unwrap().items, 4);
    assert_eq!(report.variant_groups, Some(4));

    let r1 = store.get_document("r1").unwrap().unwrap();
    assert_eq!(r1.candidates, terms(&["bad cut", "rail head"]));
    assert_eq!(r1.final_terms, r1.candidates);

    let candidates = store.field_terms(Field::TermCandidates).unwrap();
    assert_eq!(candidates["bad cut"], 3);
    assert_eq!(candidates["web void"], 2);

    let csv = std::fs::read_to_string(config.output_dir.join("term_candidates.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("term,weight"));
    assert_eq!(lines.next(), Some("bad cut,3"));
    assert_eq!(csv.lines().count(), 6);
    assert!(config.output_dir.join("term_candidates.db").exists());

    let variants = std::fs::read_to_string(config.output_dir.join("term_variants.csv")).unwrap();
    assert!(variants.lines().any(|l| l == "Surface defects,surface defects"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stages"][0]["stage"], "tagging");
    assert_eq!(json["accepted"], 5);
}

#[test]
fn test_frequency_threshold_and_cutoff() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.min_term_freq = 2;
    config.cutoff_threshold = 0.0;
    let store = seeded_store(&config);
    let connector = store.connector();

    let report = Pipeline::new(config, &store, &connector, Arc::new(RuleBasedAnalyzer))
        .unwrap()
        .run()
        .unwrap();

    // Only "bad cut" occurs more than twice
    let candidates: BTreeSet<String> = store
        .field_terms(Field::TermCandidates)
        .unwrap()
        .into_keys()
        .collect();
    assert_eq!(candidates, terms(&["bad cut"]));
    assert_eq!(report.accepted, 1);

    let r4 = store.get_document("r4").unwrap().unwrap();
    assert!(r4.candidates.is_empty());
    assert!(r4.final_terms.is_empty());
}

#[test]
fn test_dictionary_tags_join_final_terms() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    let dictionary = dir.path().join("dictionary.txt");
    std::fs::write(&dictionary, "Rail Heads\nweld seam\n").unwrap();
    config.dict_tagging = true;
    config.dictionary_path = Some(dictionary);
    config.cutoff_threshold = 1000.0;
    let store = seeded_store(&config);
    let connector = store.connector();

    let report = Pipeline::new(config, &store, &connector, Arc::new(RuleBasedAnalyzer))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(report.accepted, 0);

    let r1 = store.get_document("r1").unwrap().unwrap();
    assert_eq!(r1.dict_terms, terms(&["rail head"]));
    assert_eq!(r1.final_terms, terms(&["rail head"]));
    let r2 = store.get_document("r2").unwrap().unwrap();
    assert!(r2.dict_terms.is_empty());
    assert!(r2.final_terms.is_empty());
}

#[test]
fn test_rank_without_tagging() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    let store = seeded_store(&config);
    let connector = store.connector();
    Pipeline::new(config.clone(), &store, &connector, Arc::new(RuleBasedAnalyzer))
        .unwrap()
        .run()
        .unwrap();

    config.run_tagging = false;
    config.cutoff_threshold = 2.0;
    let report = Pipeline::new(config, &store, &connector, Arc::new(RuleBasedAnalyzer))
        .unwrap()
        .run()
        .unwrap();
    assert!(report.stage(Stage::Tagging).is_none());
    assert_eq!(report.candidates, 5);

    let r1 = store.get_document("r1").unwrap().unwrap();
    assert_eq!(r1.final_terms, terms(&["bad cut"]));
}
