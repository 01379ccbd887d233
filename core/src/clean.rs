/// Post-processing stage: normalize the translated half of each entry
///
/// Entries hold `translated <separator> original`; only the translated half
/// is normalized, the separator and the original text are preserved verbatim
/// so the original is always recoverable byte-for-byte. Entries without a
/// separator (hand-edited or pre-pipeline files) are normalized whole.
use crate::backup::{self, ArtifactError};
use crate::exclusions::is_root_container;
use crate::normalize::normalize;
use crate::worklist::{self, DocItem, WorklistError};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] WorklistError),

    #[error("artifact write failed: {0}")]
    Write(#[from] ArtifactError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanSummary {
    /// Text-bearing entries processed.
    pub nodes: usize,
    /// Entries whose translated half actually changed.
    pub changed: usize,
}

pub fn run_clean(
    input: &Path,
    output: &Path,
    separator: &str,
) -> Result<CleanSummary, CleanError> {
    let mut doc = worklist::read_document(input)?;
    let mut summary = CleanSummary {
        nodes: 0,
        changed: 0,
    };

    for item in doc.items.iter_mut() {
        let DocItem::Entry { key, text } = item else {
            continue;
        };
        if is_root_container(key) || text.trim().is_empty() {
            continue;
        }
        summary.nodes += 1;

        let rewritten = match text.split_once(separator) {
            Some((translated, original)) => {
                let cleaned = normalize(translated);
                if cleaned == translated {
                    continue;
                }
                format!("{cleaned}{separator}{original}")
            }
            None => {
                let cleaned = normalize(text);
                if cleaned == *text {
                    continue;
                }
                cleaned
            }
        };

        summary.changed += 1;
        *text = rewritten;
    }

    log::info!(
        "cleaned {} of {} text entries",
        summary.changed,
        summary.nodes
    );

    let rendered = worklist::render_document(&doc);
    backup::write_artifact(output, rendered.as_bytes())?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worklist::parse_document;
    use std::fs;
    use tempfile::TempDir;

    const SEPARATOR: &str = "\n---\n";

    fn run(input_xml: &str) -> (CleanSummary, String) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("translated.xml");
        let output = dir.path().join("cleaned.xml");
        fs::write(&input, input_xml).unwrap();

        let summary = run_clean(&input, &output, SEPARATOR).unwrap();
        let content = fs::read_to_string(&output).unwrap();
        (summary, content)
    }

    #[test]
    fn normalizes_translated_half_and_keeps_original() {
        let (summary, content) = run(
            "<infotexts language=\"Russian\">\
             <k>Hello  . .  world !!\n---\nHello original</k>\
             </infotexts>",
        );

        assert_eq!(summary.nodes, 1);
        assert_eq!(summary.changed, 1);

        let doc = parse_document(&content).unwrap();
        match &doc.items[0] {
            DocItem::Entry { text, .. } => {
                assert_eq!(text, "Hello. world!\n---\nHello original");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn entries_without_separator_are_normalized_whole() {
        let (summary, content) = run(
            "<infotexts><k>Loose text !!</k></infotexts>",
        );
        assert_eq!(summary.changed, 1);
        assert!(content.contains("Loose text!"));
    }

    #[test]
    fn already_clean_entries_are_left_alone() {
        let (summary, _) = run(
            "<infotexts><k>Already fine.\n---\noriginal</k></infotexts>",
        );
        assert_eq!(summary.nodes, 1);
        assert_eq!(summary.changed, 0);
    }

    #[test]
    fn root_attributes_pass_through_unchanged() {
        let (_, content) = run(
            "<infotexts language=\"Russian\" nowhitespace=\"true\" translatedname=\"X\">\
             <k>t\n---\no</k></infotexts>",
        );
        let doc = parse_document(&content).unwrap();
        assert_eq!(doc.language.as_deref(), Some("Russian"));
        assert_eq!(doc.nowhitespace.as_deref(), Some("true"));
        assert_eq!(doc.translated_name.as_deref(), Some("X"));
    }
}
