pub mod aggregate;
pub mod backup;
pub mod clean;
pub mod config;
pub mod encoding;
pub mod exclusions;
pub mod extract;
pub mod index;
pub mod keys;
pub mod mods;
pub mod normalize;
pub mod pipeline;
pub mod scanner;
pub mod translate;
pub mod worklist;

pub use aggregate::{Aggregator, FrequentTag};
pub use clean::{run_clean, CleanError, CleanSummary};
pub use config::{PipelineConfig, BASELINE_LANGUAGE};
pub use exclusions::{ExclusionSet, ROOT_CONTAINER_TAGS};
pub use extract::TextEntry;
pub use index::TranslationIndex;
pub use keys::{derive_key, sanitize_tag_name};
pub use mods::locate_mod;
pub use normalize::normalize;
pub use pipeline::{ExtractionOutcome, ExtractionPipeline, ExtractionStats, PipelineError};
pub use scanner::{FileScanner, ScanConfig, SourceKind};
pub use translate::driver::{run_translation, StageError, TranslateStageConfig, TranslateSummary};
pub use translate::{engine_or_passthrough, PassthroughTranslator, TranslationError, Translator};
pub use worklist::{read_document, render_document, write_worklist, DocItem, LocalizationDoc};
