/// The flat worklist document: the pipeline's sole artifact between stages
///
/// Extraction writes it, the translation driver rewrites each entry's text,
/// and the cleaner rewrites it once more. Provenance comments ride along as
/// ordinary items so every stage preserves them.
use crate::extract::TextEntry;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Root element of every pipeline artifact.
pub const ROOT_TAG: &str = "infotexts";

#[derive(Debug, Error)]
pub enum WorklistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document parse error: {0}")]
    Parse(String),

    #[error("document has no root element")]
    MissingRoot,
}

/// One item of a flat localization document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocItem {
    Comment(String),
    /// `text` is plain (unescaped) here; writers escape on output.
    Entry { key: String, text: String },
}

#[derive(Debug, Clone, Default)]
pub struct LocalizationDoc {
    pub language: Option<String>,
    pub translated_name: Option<String>,
    pub nowhitespace: Option<String>,
    pub items: Vec<DocItem>,
}

impl LocalizationDoc {
    pub fn entry_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, DocItem::Entry { .. }))
            .count()
    }
}

/// Serializes the deduplicated worklist: one element per entry, a provenance
/// comment per entry, and a boundary comment whenever the owning mod changes
/// between adjacent entries of the pre-sorted sequence.
pub fn write_worklist(
    entries: &[TextEntry],
    output: &Path,
    language: &str,
    translated_name: &str,
) -> Result<(), WorklistError> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!(
        "<{ROOT_TAG} language=\"{}\" nowhitespace=\"false\" translatedname=\"{}\">\n\n",
        escape(language),
        escape(translated_name),
    ));

    let mut current_mod: Option<&str> = None;
    for entry in entries {
        if current_mod != Some(entry.mod_name.as_str()) {
            if current_mod.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("  <!-- Texts from Mod: {} -->\n", entry.mod_name));
            current_mod = Some(entry.mod_name.as_str());
        }

        out.push_str(&format!("  <!-- Original File: {} -->\n", entry.source_path));
        // entry.text is already markup-escaped
        out.push_str(&format!("  <{0}>{1}</{0}>\n", entry.key, entry.text));
    }

    out.push_str(&format!("\n</{ROOT_TAG}>\n"));
    fs::write(output, out)?;
    Ok(())
}

/// Reads a flat localization document back into ordered items. Entry text is
/// unescaped to its plain form; indentation between elements is dropped, text
/// inside entries is kept byte-exact.
pub fn read_document(path: &Path) -> Result<LocalizationDoc, WorklistError> {
    let content = crate::encoding::read_text_file(path)?;
    parse_document(&content)
}

pub fn parse_document(content: &str) -> Result<LocalizationDoc, WorklistError> {
    let mut reader = Reader::from_str(content);

    let mut doc = LocalizationDoc::default();
    let mut saw_root = false;
    let mut pending: Option<(String, String)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !saw_root {
                    saw_root = true;
                    doc.language = attr(&e, "language")?;
                    doc.translated_name = attr(&e, "translatedname")?;
                    doc.nowhitespace = attr(&e, "nowhitespace")?;
                } else {
                    pending = Some((tag, String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !saw_root {
                    saw_root = true;
                    doc.language = attr(&e, "language")?;
                    doc.translated_name = attr(&e, "translatedname")?;
                    doc.nowhitespace = attr(&e, "nowhitespace")?;
                } else {
                    doc.items.push(DocItem::Entry {
                        key: tag,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::End(_)) => {
                if let Some((key, text)) = pending.take() {
                    doc.items.push(DocItem::Entry { key, text });
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, text)) = pending.as_mut() {
                    let piece = t
                        .unescape()
                        .map_err(|e| WorklistError::Parse(e.to_string()))?;
                    text.push_str(&piece);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((_, text)) = pending.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Comment(c)) => {
                if pending.is_none() {
                    let comment = String::from_utf8_lossy(&c).trim().to_string();
                    doc.items.push(DocItem::Comment(comment));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(WorklistError::Parse(e.to_string())),
        }
        buf.clear();
    }

    if !saw_root {
        return Err(WorklistError::MissingRoot);
    }
    Ok(doc)
}

/// Renders a document back to markup text, escaping entry text on the way
/// out.
pub fn render_document(doc: &LocalizationDoc) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!("<{ROOT_TAG}"));
    if let Some(language) = &doc.language {
        out.push_str(&format!(" language=\"{}\"", escape(language.as_str())));
    }
    if let Some(nowhitespace) = &doc.nowhitespace {
        out.push_str(&format!(" nowhitespace=\"{}\"", escape(nowhitespace.as_str())));
    }
    if let Some(translated_name) = &doc.translated_name {
        out.push_str(&format!(
            " translatedname=\"{}\"",
            escape(translated_name.as_str())
        ));
    }
    out.push_str(">\n");

    for item in &doc.items {
        match item {
            DocItem::Comment(comment) => {
                out.push_str(&format!("  <!-- {comment} -->\n"));
            }
            DocItem::Entry { key, text } => {
                out.push_str(&format!("  <{0}>{1}</{0}>\n", key, partial_escape(text)));
            }
        }
    }

    out.push_str(&format!("</{ROOT_TAG}>\n"));
    out
}

fn attr(
    e: &quick_xml::events::BytesStart,
    name: &str,
) -> Result<Option<String>, WorklistError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| WorklistError::Parse(err.to_string()))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|err| WorklistError::Parse(err.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(mod_name: &str, key: &str, text: &str, path: &str) -> TextEntry {
        TextEntry {
            key: key.to_string(),
            text: text.to_string(),
            source_path: path.to_string(),
            mod_name: mod_name.to_string(),
        }
    }

    #[test]
    fn worklist_round_trips_through_the_reader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/worklist.xml");
        let entries = vec![
            entry("Alpha", "greeting.hi", "Hello &amp; welcome", "Alpha/a.xml"),
            entry("Alpha", "greeting.yo", "Yo", "Alpha/a.xml"),
            entry("Beta", "lua_name", "Drill", "Beta/init.lua"),
        ];

        write_worklist(&entries, &path, "Russian", "Русский").unwrap();
        let doc = read_document(&path).unwrap();

        assert_eq!(doc.language.as_deref(), Some("Russian"));
        assert_eq!(doc.translated_name.as_deref(), Some("Русский"));
        assert_eq!(doc.nowhitespace.as_deref(), Some("false"));
        assert_eq!(doc.entry_count(), 3);

        // escaped on disk, plain after reading
        let texts: Vec<&str> = doc
            .items
            .iter()
            .filter_map(|item| match item {
                DocItem::Entry { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Hello & welcome", "Yo", "Drill"]);
    }

    #[test]
    fn mod_boundary_comments_appear_once_per_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worklist.xml");
        let entries = vec![
            entry("Alpha", "a", "1", "p"),
            entry("Alpha", "b", "2", "p"),
            entry("Beta", "c", "3", "p"),
        ];

        write_worklist(&entries, &path, "Russian", "Русский").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert_eq!(content.matches("Texts from Mod: Alpha").count(), 1);
        assert_eq!(content.matches("Texts from Mod: Beta").count(), 1);
        assert_eq!(content.matches("Original File:").count(), 3);
    }

    #[test]
    fn reader_preserves_comment_and_entry_order() {
        let doc = parse_document(
            r#"<?xml version="1.0" encoding="utf-8"?>
<infotexts language="Russian" nowhitespace="false" translatedname="Русский">
  <!-- Texts from Mod: Alpha -->
  <!-- Original File: Alpha/a.xml -->
  <greeting.hi>Hello</greeting.hi>
</infotexts>"#,
        )
        .unwrap();

        assert_eq!(doc.items.len(), 3);
        assert!(matches!(&doc.items[0], DocItem::Comment(c) if c.contains("Alpha")));
        assert!(matches!(&doc.items[2], DocItem::Entry { key, .. } if key == "greeting.hi"));
    }

    #[test]
    fn entry_text_keeps_inner_whitespace_exactly() {
        let doc = parse_document(
            "<infotexts><k>line one\n---\nline two</k></infotexts>",
        )
        .unwrap();

        match &doc.items[0] {
            DocItem::Entry { text, .. } => assert_eq!(text, "line one\n---\nline two"),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn render_round_trips_escaping() {
        let mut doc = LocalizationDoc {
            language: Some("Russian".into()),
            translated_name: Some("Русский".into()),
            nowhitespace: Some("false".into()),
            items: vec![DocItem::Entry {
                key: "k".into(),
                text: "Fish & Chips".into(),
            }],
        };

        let rendered = render_document(&doc);
        assert!(rendered.contains("Fish &amp; Chips"));

        let back = parse_document(&rendered).unwrap();
        match &back.items[0] {
            DocItem::Entry { text, .. } => assert_eq!(text, "Fish & Chips"),
            other => panic!("unexpected item {other:?}"),
        }

        doc.items.clear();
        let empty = render_document(&doc);
        assert!(parse_document(&empty).unwrap().items.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(matches!(
            parse_document("  "),
            Err(WorklistError::MissingRoot)
        ));
    }
}
