//! Script-source extraction.
//!
//! This is a heuristic pattern scanner, not a parser: it matches a whitelist
//! of UI-facing property assignments and text-displaying call sites against
//! the raw file content. Multi-line strings and string concatenation are
//! known false negatives; generalizing this into a real parser is explicitly
//! out of scope.

use super::TextEntry;
use crate::keys;
use once_cell::sync::Lazy;
use quick_xml::escape::partial_escape;
use regex::Regex;

/// `name = "..."` style assignments for properties that reach the player.
static PROPERTY_ASSIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(name|label|displayname|tooltip|description|text)\s*=\s*"([^"]*)""#)
        .expect("valid property assignment regex")
});

/// Calls that display a string literal directly.
static TEXT_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:Text|Texts\.Get|Game\.ShowMessageBox)\s*\(\s*"([^"]*)""#)
        .expect("valid text call regex")
});

/// Key used for all call-site hits.
const CALL_SITE_KEY: &str = "lua_func_text";

/// Extracts text entries from script source content.
pub fn extract_script(content: &str, source_path: &str, mod_name: &str) -> Vec<TextEntry> {
    let mut entries = Vec::new();

    for captures in PROPERTY_ASSIGN_RE.captures_iter(content) {
        let property = captures[1].to_ascii_lowercase();
        let value = captures[2].trim();
        if value.is_empty() {
            continue;
        }
        entries.push(TextEntry {
            key: keys::sanitize_tag_name(&format!("lua_{property}")),
            text: partial_escape(value).into_owned(),
            source_path: source_path.to_string(),
            mod_name: mod_name.to_string(),
        });
    }

    for captures in TEXT_CALL_RE.captures_iter(content) {
        let value = captures[1].trim();
        if value.is_empty() {
            continue;
        }
        entries.push(TextEntry {
            key: keys::sanitize_tag_name(CALL_SITE_KEY),
            text: partial_escape(value).into_owned(),
            source_path: source_path.to_string(),
            mod_name: mod_name.to_string(),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<TextEntry> {
        extract_script(content, "mods/TestMod/init.lua", "TestMod")
    }

    #[test]
    fn extracts_whitelisted_property_assignments() {
        let src = r#"
            item.name = "Plasma Cutter"
            item.tooltip = "Cuts through hulls"
            item.weight = "12"
        "#;

        let entries = extract(src);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "lua_name");
        assert_eq!(entries[0].text, "Plasma Cutter");
        assert_eq!(entries[1].key, "lua_tooltip");
    }

    #[test]
    fn property_names_match_case_insensitively() {
        let src = r#"DisplayName = "Reactor""#;
        let entries = extract(src);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "lua_displayname");
    }

    #[test]
    fn extracts_text_call_sites() {
        let src = r#"
            Game.ShowMessageBox("Hull breach detected")
            local t = Texts.Get("Diving suit required")
        "#;

        let entries = extract(src);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.key == "lua_func_text"));
        assert!(entries.iter().any(|e| e.text == "Hull breach detected"));
    }

    #[test]
    fn empty_and_whitespace_literals_are_skipped() {
        let src = r#"
            name = ""
            label = "   "
            Text("")
        "#;
        assert!(extract(src).is_empty());
    }

    #[test]
    fn values_are_markup_escaped() {
        let src = r#"description = "Fish & Chips <rare>""#;
        let entries = extract(src);
        assert_eq!(entries[0].text, "Fish &amp; Chips &lt;rare&gt;");
    }
}
