//! Pipeline orchestrator: sequences the five stages of a run.
//!
//! 1. Tagging: page through the corpus, extract and filter candidates and
//!    optionally dictionary tags, persist them.
//! 2. Ranking: C-value over the corpus-wide candidate vocabulary.
//! 3. Cutoff: keep terms scoring above the threshold; persist the ranked
//!    list.
//! 4. Finalization: write each document's accepted terms.
//! 5. Variant aggregation (optional): group accepted terms by key.
//!
//! Each stage needs the corpus-wide result of the previous one, so no stage
//! starts before the prior completes. A failed page update is logged and
//! the pass moves on to the next page.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use termsage_core::{Error, NormalizationCache, PipelineConfig, Result, TaskPool};
use termsage_dict::{Dictionary, DictionaryTagger};
use termsage_extract::CandidateTagger;
use termsage_nlp::LinguisticAnalyzer;
use termsage_rank::{apply_cutoff, CValueRanker, TermScore};
use termsage_store::{CorpusStore, Document, Field, StoreConnector};

use crate::export::{self, RANKED_CSV_FILE, RANKED_DB_FILE, VARIANTS_CSV_FILE};
use crate::types::*;
use crate::variants::group_variants;

pub struct Pipeline<'a> {
    config: PipelineConfig,
    store: &'a dyn CorpusStore,
    connector: &'a dyn StoreConnector,
    analyzer: Arc<dyn LinguisticAnalyzer>,
    pool: TaskPool,
    cache: NormalizationCache,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: PipelineConfig,
        store: &'a dyn CorpusStore,
        connector: &'a dyn StoreConnector,
        analyzer: Arc<dyn LinguisticAnalyzer>,
    ) -> Result<Self> {
        config.validate()?;
        let pool = TaskPool::new(config.workers)?;
        Ok(Self {
            config,
            store,
            connector,
            analyzer,
            pool,
            cache: NormalizationCache::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured stage.
    pub fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new();
        report.documents_total = self.store.total_documents()?;
        info!(
            "Starting terminology run {} over {} documents ({} workers)",
            report.run_id,
            report.documents_total,
            self.pool.workers()
        );

        // Stage 1: candidate and dictionary tagging
        if self.config.run_tagging {
            let stage_start = Instant::now();
            let tally = self.tag_corpus()?;
            report.stages.push(StageReport {
                stage: Stage::Tagging,
                items: tally.updated,
                failed: tally.failed,
                duration_ms: stage_start.elapsed().as_millis() as u64,
            });
        } else {
            info!("Tagging skipped, ranking existing candidates");
        }

        // Stage 2: ranking
        let stage_start = Instant::now();
        let ranked = self.rank_candidates(&mut report)?;
        report.ranked = ranked.len();
        report.stages.push(StageReport {
            stage: Stage::Ranking,
            items: ranked.len(),
            failed: report.candidates.saturating_sub(ranked.len()),
            duration_ms: stage_start.elapsed().as_millis() as u64,
        });

        // Stage 3: cutoff
        let stage_start = Instant::now();
        let accepted = self.cutoff(&ranked)?;
        report.accepted = accepted.len();
        report.stages.push(StageReport {
            stage: Stage::Cutoff,
            items: accepted.len(),
            failed: 0,
            duration_ms: stage_start.elapsed().as_millis() as u64,
        });

        // Stage 4: finalization
        let stage_start = Instant::now();
        let tally = self.finalize(&accepted)?;
        report.stages.push(StageReport {
            stage: Stage::Finalization,
            items: tally.updated,
            failed: tally.failed,
            duration_ms: stage_start.elapsed().as_millis() as u64,
        });

        // Stage 5: variant aggregation
        if self.config.export_term_variants {
            let stage_start = Instant::now();
            let groups = self.aggregate_variants(&accepted)?;
            report.variant_groups = Some(groups);
            report.stages.push(StageReport {
                stage: Stage::VariantAggregation,
                items: groups,
                failed: 0,
                duration_ms: stage_start.elapsed().as_millis() as u64,
            });
        } else {
            info!("Skipping term variant export");
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Terminology run complete: candidates={}, ranked={}, accepted={}, duration={}ms",
            report.candidates, report.ranked, report.accepted, report.duration_ms
        );
        Ok(report)
    }

    fn tag_corpus(&self) -> Result<PageTally> {
        let tagger = CandidateTagger::from_config(&self.config, self.analyzer.clone())?;
        let dict_tagger = if self.config.dict_tagging {
            let path = self.config.dictionary_path.as_deref().ok_or_else(|| {
                Error::Config("dictionary_path is required for dict_tagging".into())
            })?;
            let dictionary = Dictionary::load(path, self.store)?;
            Some(DictionaryTagger::from_config(&self.config, dictionary))
        } else {
            None
        };

        self.process_pages(Stage::Tagging, |doc| {
            doc.candidates = tagger.tag(&doc.content, self.store, Some(&self.cache))?;
            if let Some(dict_tagger) = &dict_tagger {
                doc.dict_terms = dict_tagger.tag_document(self.store, &self.pool, &doc.id)?;
            }
            Ok(())
        })
    }

    fn rank_candidates(&self, report: &mut RunReport) -> Result<Vec<TermScore>> {
        let mut vocabulary: Vec<String> = self
            .store
            .field_terms(Field::TermCandidates)?
            .into_keys()
            .collect();
        vocabulary.sort();
        report.candidates = vocabulary.len();
        if vocabulary.is_empty() {
            warn!("No term candidates in the corpus");
            return Ok(Vec::new());
        }
        CValueRanker::new(self.connector, &self.pool, &self.cache).rank(&vocabulary)
    }

    fn cutoff(&self, ranked: &[TermScore]) -> Result<BTreeSet<String>> {
        let threshold = self.config.cutoff_threshold;
        let accepted: BTreeSet<String> = apply_cutoff(ranked, threshold)
            .into_iter()
            .map(|t| t.term)
            .collect();
        info!(
            "Cutoff {}: {} of {} ranked terms accepted",
            threshold,
            accepted.len(),
            ranked.len()
        );

        let db_path = self.config.output_dir.join(RANKED_DB_FILE);
        export::save_ranked_terms(&db_path, ranked)?;
        if self.config.export_term_candidates {
            export::export_ranked_csv(&self.config.output_dir.join(RANKED_CSV_FILE), ranked)?;
        }
        Ok(accepted)
    }

    fn finalize(&self, accepted: &BTreeSet<String>) -> Result<PageTally> {
        let with_dict = self.config.index_dict_terms_with_final_terms;
        self.process_pages(Stage::Finalization, |doc| {
            doc.final_terms = final_terms(doc, accepted, with_dict);
            Ok(())
        })
    }

    fn aggregate_variants(&self, accepted: &BTreeSet<String>) -> Result<usize> {
        let groups = group_variants(
            self.store,
            accepted,
            &self.config.variant_analyzer,
            &self.cache,
        )?;
        export::export_variants_csv(&self.config.output_dir.join(VARIANTS_CSV_FILE), &groups)?;
        Ok(groups.len())
    }

    /// Page through every document, annotate it and persist the page.
    fn process_pages<F>(&self, stage: Stage, mut annotate: F) -> Result<PageTally>
    where
        F: FnMut(&mut Document) -> Result<()>,
    {
        let page_size = self.config.page_size;
        let mut tally = PageTally::default();
        let mut offset = 0;

        loop {
            let page = self.store.load_documents(offset, page_size)?;
            if page.docs.is_empty() {
                break;
            }
            let fetched = page.docs.len();

            let mut ready = Vec::with_capacity(fetched);
            for mut doc in page.docs {
                match annotate(&mut doc) {
                    Ok(()) => ready.push(doc),
                    Err(e) => {
                        tally.failed += 1;
                        error!("{}: document {} skipped: {}", stage, doc.id, e);
                    }
                }
            }

            match self.store.batch_update_documents(&ready) {
                Ok(updated) => tally.updated += updated,
                Err(e) => {
                    tally.failed += ready.len();
                    error!("{}: page at offset {} not persisted: {}", stage, offset, e);
                }
            }

            offset += fetched;
            info!("{}: {}/{} documents", stage, offset.min(page.total), page.total);
            if offset >= page.total {
                break;
            }
        }
        Ok(tally)
    }
}

/// A document's candidates that were accepted, plus its dictionary tags
/// when `with_dict` is set.
pub fn final_terms(
    doc: &Document,
    accepted: &BTreeSet<String>,
    with_dict: bool,
) -> BTreeSet<String> {
    let mut terms: BTreeSet<String> = doc.candidates.intersection(accepted).cloned().collect();
    if with_dict {
        terms.extend(doc.dict_terms.iter().cloned());
    }
    terms
}
