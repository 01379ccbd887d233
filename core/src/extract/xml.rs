//! Markup extraction: streams a document once, pulling text nodes whose
//! elements are not excluded, and deriving a stable key per element from its
//! tag name and `identifier`/`name` attribute.

use super::{ExtractError, TextEntry};
use crate::config::BASELINE_LANGUAGE;
use crate::exclusions::{is_root_container, ExclusionSet};
use crate::keys;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;

/// Element context carried on the parse stack.
struct Frame {
    raw_tag: String,
    identifier: Option<String>,
}

/// Extracts `(key, text)` entries from a markup document whose declared
/// language matches `language_filter`. Documents without a `language`
/// attribute count as the baseline source language.
pub fn extract_markup(
    content: &str,
    source_path: &str,
    mod_name: &str,
    language_filter: &str,
    exclusions: &ExclusionSet,
) -> Result<Vec<TextEntry>, ExtractError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut saw_root = false;
    // Text immediately after a start tag is the element's own text; anything
    // after a child's end tag is tail content belonging to nobody we track.
    let mut expecting_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if !saw_root {
                    saw_root = true;
                    if !language_matches(&e, language_filter)? {
                        return Ok(entries);
                    }
                }
                stack.push(read_frame(&e)?);
                expecting_text = true;
            }
            Ok(Event::Empty(e)) => {
                if !saw_root {
                    saw_root = true;
                    if !language_matches(&e, language_filter)? {
                        return Ok(entries);
                    }
                }
                expecting_text = false;
            }
            Ok(Event::End(_)) => {
                stack.pop();
                expecting_text = false;
            }
            Ok(Event::Text(t)) => {
                if expecting_text {
                    if let Some(frame) = stack.last() {
                        if !exclusions.contains(&frame.raw_tag) {
                            let text = t
                                .unescape()
                                .map_err(|e| ExtractError::Parse(e.to_string()))?;
                            push_entry(&mut entries, frame, &text, source_path, mod_name);
                        }
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if expecting_text {
                    if let Some(frame) = stack.last() {
                        if !exclusions.contains(&frame.raw_tag) {
                            let text = String::from_utf8_lossy(&c);
                            push_entry(&mut entries, frame, &text, source_path, mod_name);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::Parse(e.to_string())),
        }
        buf.clear();
    }

    Ok(entries)
}

/// Collects the derived key of every element in a document declared in
/// `language`, for the existing-translation index. Returns an empty set when
/// the document's language does not match. Elements are keyed whether or not
/// they carry text: an existing translation file may hold empty entries and
/// they still mark the key as covered.
pub fn collect_keys(content: &str, language: &str) -> Result<HashSet<String>, ExtractError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut keys = HashSet::new();
    let mut saw_root = false;
    let mut matches = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if !saw_root {
                    saw_root = true;
                    matches = declared_language(&e)?
                        .map(|l| l.eq_ignore_ascii_case(language))
                        .unwrap_or(false);
                    if !matches {
                        return Ok(keys);
                    }
                }
                let frame = read_frame(&e)?;
                if !is_root_container(&frame.raw_tag) {
                    keys.insert(keys::derive_key(&frame.raw_tag, frame.identifier.as_deref()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::Parse(e.to_string())),
        }
        buf.clear();
    }

    Ok(keys)
}

fn push_entry(
    entries: &mut Vec<TextEntry>,
    frame: &Frame,
    text: &str,
    source_path: &str,
    mod_name: &str,
) {
    let stripped = text.trim();
    if stripped.is_empty() {
        return;
    }

    entries.push(TextEntry {
        key: keys::derive_key(&frame.raw_tag, frame.identifier.as_deref()),
        text: partial_escape(stripped).into_owned(),
        source_path: source_path.to_string(),
        mod_name: mod_name.to_string(),
    });
}

fn read_frame(e: &BytesStart) -> Result<Frame, ExtractError> {
    let raw_tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let identifier = attribute(e, "identifier")?.or(attribute(e, "name")?);
    Ok(Frame {
        raw_tag,
        identifier,
    })
}

fn language_matches(root: &BytesStart, filter: &str) -> Result<bool, ExtractError> {
    Ok(match declared_language(root)? {
        Some(lang) => lang.eq_ignore_ascii_case(filter),
        None => filter.eq_ignore_ascii_case(BASELINE_LANGUAGE),
    })
}

fn declared_language(root: &BytesStart) -> Result<Option<String>, ExtractError> {
    attribute(root, "language")
}

fn attribute(e: &BytesStart, name: &str) -> Result<Option<String>, ExtractError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| ExtractError::Parse(err.to_string()))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|err| ExtractError::Parse(err.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str, filter: &str) -> Vec<TextEntry> {
        extract_markup(
            content,
            "mods/TestMod/file.xml",
            "TestMod",
            filter,
            &ExclusionSet::default(),
        )
        .unwrap()
    }

    #[test]
    fn extracts_text_with_identifier_keys() {
        let doc = r#"<infotexts language="English">
            <greeting identifier="hello">Hello there</greeting>
            <farewell name="bye">Goodbye</farewell>
        </infotexts>"#;

        let entries = extract(doc, "English");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "greeting.hello");
        assert_eq!(entries[0].text, "Hello there");
        assert_eq!(entries[1].key, "farewell.bye");
    }

    #[test]
    fn identifier_attribute_wins_over_name() {
        let doc = r#"<infotexts language="English">
            <entry identifier="first" name="second">text</entry>
        </infotexts>"#;

        let entries = extract(doc, "English");
        assert_eq!(entries[0].key, "entry.first");
    }

    #[test]
    fn language_mismatch_yields_nothing() {
        let doc = r#"<infotexts language="German"><a>Hallo</a></infotexts>"#;
        assert!(extract(doc, "English").is_empty());
    }

    #[test]
    fn missing_language_counts_as_baseline_only() {
        let doc = r#"<infotexts><a>Hi</a></infotexts>"#;
        assert_eq!(extract(doc, "English").len(), 1);
        assert!(extract(doc, "Russian").is_empty());
    }

    #[test]
    fn language_comparison_ignores_case() {
        let doc = r#"<infotexts language="english"><a>Hi</a></infotexts>"#;
        assert_eq!(extract(doc, "English").len(), 1);
    }

    #[test]
    fn excluded_tags_are_skipped_but_not_their_children() {
        let doc = r#"<infotexts language="English">
            <sprite>path/to.png<label>Visible</label></sprite>
        </infotexts>"#;

        let entries = extract(doc, "English");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "label");
        assert_eq!(entries[0].text, "Visible");
    }

    #[test]
    fn whitespace_only_text_is_skipped() {
        let doc = "<infotexts language=\"English\"><a>   \n\t  </a></infotexts>";
        assert!(extract(doc, "English").is_empty());
    }

    #[test]
    fn tail_text_is_not_attributed_to_the_parent() {
        let doc = r#"<infotexts language="English">
            <a><sound>s.ogg</sound>tail noise</a>
        </infotexts>"#;

        // "tail noise" follows the child's end tag; the original parser never
        // saw it as element text either.
        assert!(extract(doc, "English").is_empty());
    }

    #[test]
    fn text_is_markup_escaped() {
        let doc = r#"<infotexts language="English"><a>Fish &amp; Chips</a></infotexts>"#;
        let entries = extract(doc, "English");
        assert_eq!(entries[0].text, "Fish &amp; Chips");
    }

    #[test]
    fn collects_keys_for_matching_language_only() {
        let doc = r#"<infotexts language="Russian">
            <greeting identifier="hello">Привет</greeting>
            <empty identifier="gap"/>
        </infotexts>"#;

        let keys = collect_keys(doc, "Russian").unwrap();
        assert!(keys.contains("greeting.hello"));
        assert!(keys.contains("empty.gap"));
        assert!(!keys.contains("infotexts"));

        assert!(collect_keys(doc, "English").unwrap().is_empty());
    }

    #[test]
    fn malformed_markup_is_a_parse_error() {
        let doc = "<infotexts language=\"English\"><a>text";
        let err = extract_markup(
            doc,
            "p",
            "m",
            "English",
            &ExclusionSet::default(),
        );
        assert!(err.is_err());
    }
}
