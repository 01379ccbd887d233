//! Batch translation driver.
//!
//! Feeds worklist text through a translation engine in strictly ordered
//! chunks and rewrites the document with `translated <separator> original`
//! combined text. A failed chunk degrades to tagged placeholders; a
//! length-mismatched chunk aborts the stage, because misaligned outputs
//! would silently attach translations to the wrong elements.

use super::{TranslationError, Translator};
use crate::backup::{self, ArtifactError};
use crate::exclusions::is_root_container;
use crate::worklist::{self, DocItem, WorklistError};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Marker prefixed to every entry of a chunk whose translation call failed.
pub const FAILED_BATCH_MARKER: &str = "[TRANSLATION_ERROR]";

#[derive(Debug, Error)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] WorklistError),

    #[error("translation output misaligned: expected {expected} texts, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("artifact write failed: {0}")]
    Write(#[from] ArtifactError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSummary {
    pub engine: String,
    pub entries: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

#[derive(Debug, Clone)]
pub struct TranslateStageConfig {
    pub batch_size: usize,
    pub separator: String,
    pub target_language: String,
    pub translated_name: String,
}

/// Runs the translation stage: worklist in, translated-with-originals
/// document out.
pub fn run_translation(
    input: &Path,
    output: &Path,
    engine: &mut dyn Translator,
    config: &TranslateStageConfig,
) -> Result<TranslateSummary, StageError> {
    let mut doc = worklist::read_document(input)?;

    // Indices of items that actually carry text to translate.
    let mut targets: Vec<usize> = Vec::new();
    let mut originals: Vec<String> = Vec::new();
    for (idx, item) in doc.items.iter().enumerate() {
        if let DocItem::Entry { key, text } = item {
            if !is_root_container(key) && !text.trim().is_empty() {
                targets.push(idx);
                originals.push(text.clone());
            }
        }
    }

    log::info!(
        "translating {} texts with engine '{}' in batches of {}",
        originals.len(),
        engine.name(),
        config.batch_size
    );

    let batch_size = config.batch_size.max(1);
    let mut translated: Vec<String> = Vec::with_capacity(originals.len());
    let mut batches = 0usize;
    let mut failed_batches = 0usize;

    for chunk in originals.chunks(batch_size) {
        batches += 1;
        match engine.translate_batch(chunk) {
            Ok(outputs) => {
                if outputs.len() != chunk.len() {
                    return Err(StageError::LengthMismatch {
                        expected: chunk.len(),
                        actual: outputs.len(),
                    });
                }
                translated.extend(outputs);
            }
            Err(TranslationError::LengthMismatch { expected, actual }) => {
                return Err(StageError::LengthMismatch { expected, actual });
            }
            Err(err) => {
                log::warn!("batch {batches} failed ({err}), substituting placeholders");
                failed_batches += 1;
                translated.extend(
                    chunk
                        .iter()
                        .map(|text| format!("{FAILED_BATCH_MARKER} {text}")),
                );
            }
        }
        log::info!("progress: {}/{}", translated.len(), originals.len());
    }

    if translated.len() != originals.len() {
        return Err(StageError::LengthMismatch {
            expected: originals.len(),
            actual: translated.len(),
        });
    }

    for (slot, (idx, original)) in targets.iter().zip(originals.iter()).enumerate() {
        let combined = format!("{}{}{}", translated[slot], config.separator, original);
        if let DocItem::Entry { text, .. } = &mut doc.items[*idx] {
            *text = combined;
        }
    }

    doc.language = Some(config.target_language.clone());
    doc.translated_name = Some(config.translated_name.clone());
    if doc.nowhitespace.is_none() {
        doc.nowhitespace = Some("false".to_string());
    }

    let rendered = worklist::render_document(&doc);
    backup::write_artifact(output, rendered.as_bytes())?;

    Ok(TranslateSummary {
        engine: engine.name().to_string(),
        entries: originals.len(),
        batches,
        failed_batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::PassthroughTranslator;
    use crate::worklist::parse_document;
    use std::fs;
    use tempfile::TempDir;

    const WORKLIST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<infotexts language="Russian" nowhitespace="false" translatedname="Русский">
  <!-- Texts from Mod: Alpha -->
  <!-- Original File: Alpha/a.xml -->
  <greeting.hi>Hello there</greeting.hi>
  <greeting.bye>Goodbye</greeting.bye>
</infotexts>
"#;

    fn stage_config() -> TranslateStageConfig {
        TranslateStageConfig {
            batch_size: 8,
            separator: "\n---\n".to_string(),
            target_language: "Russian".to_string(),
            translated_name: "Русский".to_string(),
        }
    }

    struct FailingTranslator;

    impl Translator for FailingTranslator {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn translate_batch(
            &mut self,
            _inputs: &[String],
        ) -> Result<Vec<String>, TranslationError> {
            Err(TranslationError::Failure("boom".into()))
        }
    }

    struct ShortTranslator;

    impl Translator for ShortTranslator {
        fn name(&self) -> &'static str {
            "short"
        }

        fn translate_batch(
            &mut self,
            inputs: &[String],
        ) -> Result<Vec<String>, TranslationError> {
            Ok(inputs.iter().take(inputs.len() - 1).cloned().collect())
        }
    }

    #[test]
    fn passthrough_combines_text_with_separator() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("worklist.xml");
        let output = dir.path().join("translated.xml");
        fs::write(&input, WORKLIST).unwrap();

        let mut engine = PassthroughTranslator;
        let summary =
            run_translation(&input, &output, &mut engine, &stage_config()).unwrap();

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.failed_batches, 0);

        let doc = parse_document(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(doc.language.as_deref(), Some("Russian"));
        match &doc.items[2] {
            DocItem::Entry { text, .. } => {
                assert_eq!(text, "Hello there\n---\nHello there");
            }
            other => panic!("unexpected item {other:?}"),
        }
        // provenance comments survive the rewrite
        assert!(doc
            .items
            .iter()
            .any(|i| matches!(i, DocItem::Comment(c) if c.contains("Original File"))));
    }

    #[test]
    fn failed_batches_get_placeholders_and_the_run_continues() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("worklist.xml");
        let output = dir.path().join("translated.xml");
        fs::write(&input, WORKLIST).unwrap();

        let mut engine = FailingTranslator;
        let summary =
            run_translation(&input, &output, &mut engine, &stage_config()).unwrap();

        assert_eq!(summary.failed_batches, 1);
        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("[TRANSLATION_ERROR] Hello there"));
        assert!(content.contains("\n---\n"));
    }

    #[test]
    fn length_mismatch_aborts_the_stage() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("worklist.xml");
        let output = dir.path().join("translated.xml");
        fs::write(&input, WORKLIST).unwrap();

        let mut engine = ShortTranslator;
        let result = run_translation(&input, &output, &mut engine, &stage_config());

        assert!(matches!(result, Err(StageError::LengthMismatch { .. })));
        assert!(!output.exists());
    }
}
