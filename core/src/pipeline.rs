/// Two-phase extraction pipeline
///
/// Phase 1 walks every markup file and indexes keys already translated into
/// the existing language. Phase 2 scans all sources, counting and filtering
/// through the aggregator. The index is complete before the first suppression
/// decision; interleaving the phases would judge early files against partial
/// coverage.
use crate::aggregate::{Aggregator, FrequentTag};
use crate::config::PipelineConfig;
use crate::exclusions::ExclusionSet;
use crate::extract::{self, TextEntry};
use crate::index::{IndexStats, TranslationIndex};
use crate::scanner::FileScanner;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] std::io::Error),

    #[error("cannot load exclusion file: {0}")]
    Exclusions(String),
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub index: IndexStats,
    /// Source files (markup + script) processed in phase 2.
    pub files_scanned: usize,
    /// Files skipped in phase 2 because they failed to open or parse.
    pub files_failed: usize,
    /// Raw text occurrences observed before any filtering.
    pub raw_entries: usize,
    /// Entries dropped because their key is already translated in their mod.
    pub suppressed_translated: usize,
    /// Entries dropped as exact `(mod, key, text)` duplicates.
    pub suppressed_duplicates: usize,
    /// Entries surviving into the worklist.
    pub worklist_entries: usize,
}

#[derive(Debug)]
pub struct ExtractionOutcome {
    pub worklist: Vec<TextEntry>,
    pub frequent_tags: Vec<FrequentTag>,
    pub stats: ExtractionStats,
    /// Human-readable per-file diagnostics from both phases.
    pub diagnostics: Vec<String>,
}

pub struct ExtractionPipeline {
    config: PipelineConfig,
    exclusions: ExclusionSet,
}

impl ExtractionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let exclusions = match &config.exclusions_file {
            Some(path) => ExclusionSet::from_file(path)
                .map_err(|e| PipelineError::Exclusions(format!("{}: {e}", path.display())))?,
            None => ExclusionSet::default(),
        };
        Ok(Self { config, exclusions })
    }

    pub fn with_exclusions(config: PipelineConfig, exclusions: ExclusionSet) -> Self {
        Self { config, exclusions }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs both phases over `root` and returns the sorted worklist, the
    /// frequency report and run statistics.
    pub fn run(&self, root: &Path) -> Result<ExtractionOutcome, PipelineError> {
        let scanner = FileScanner::new(self.config.scan.clone());

        log::info!(
            "phase 1: indexing existing '{}' translations under {}",
            self.config.existing_language,
            root.display()
        );
        let (index, index_stats, mut diagnostics) =
            TranslationIndex::build(root, &self.config.existing_language, &scanner)?;
        log::info!(
            "indexed {} keys across {} mods",
            index.total_keys(),
            index.mods()
        );

        log::info!(
            "phase 2: scanning '{}' sources",
            self.config.source_language
        );
        let files = scanner.scan(root)?;
        let mut aggregator = Aggregator::new();
        let mut stats = ExtractionStats {
            index: index_stats,
            ..Default::default()
        };

        for file in &files {
            stats.files_scanned += 1;
            let entries = match extract::extract_file(
                &file.path,
                file.kind,
                root,
                &self.config.source_language,
                &self.exclusions,
            ) {
                Ok(entries) => entries,
                Err(err) => {
                    stats.files_failed += 1;
                    let message = format!("scan: skipping {}: {err}", file.path.display());
                    log::warn!("{message}");
                    diagnostics.push(message);
                    continue;
                }
            };

            for entry in entries {
                aggregator.observe(entry, file.kind, &index);
            }
        }

        stats.raw_entries = aggregator.raw_entries();
        stats.suppressed_translated = aggregator.suppressed_translated();
        stats.suppressed_duplicates = aggregator.suppressed_duplicates();
        stats.worklist_entries = aggregator.worklist_len();

        let frequent_tags = aggregator.frequent_tags(self.config.frequent_tag_threshold);
        let worklist = aggregator.into_worklist();

        log::info!(
            "extraction done: {} raw entries, {} in worklist, {} frequent tags",
            stats.raw_entries,
            stats.worklist_entries,
            frequent_tags.len()
        );

        Ok(ExtractionOutcome {
            worklist,
            frequent_tags,
            stats,
            diagnostics,
        })
    }
}
