/// Stable key derivation for translatable markup elements
use once_cell::sync::Lazy;
use regex::Regex;

/// Substituted when a raw name sanitizes down to nothing.
pub const EMPTY_TAG_PLACEHOLDER: &str = "sanitized_empty_tag";

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static INVALID_TAG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid tag char regex"));

/// Sanitizes a raw string into a valid XML element name.
///
/// Whitespace runs collapse to `_`, everything outside `[A-Za-z0-9_.-]` is
/// dropped, and results that would be invalid or reserved as element names
/// (leading digit, `.`, `-`, or an `xml` prefix in any case) get a leading
/// underscore. Sanitizing an already-sanitized name is a no-op.
pub fn sanitize_tag_name(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw, "_");
    let cleaned = INVALID_TAG_CHARS.replace_all(&collapsed, "");

    if cleaned.is_empty() {
        return EMPTY_TAG_PLACEHOLDER.to_string();
    }

    let starts_invalid = cleaned
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.' || c == '-')
        .unwrap_or(false);

    if starts_invalid || cleaned.to_ascii_lowercase().starts_with("xml") {
        format!("_{cleaned}")
    } else {
        cleaned.into_owned()
    }
}

/// Derives the worklist key for an element: the sanitized tag name, with the
/// sanitized identifying attribute appended as a `.`-separated suffix when one
/// is present and survives sanitization.
pub fn derive_key(raw_tag: &str, identifier: Option<&str>) -> String {
    let tag = sanitize_tag_name(raw_tag);

    let key = match identifier.map(sanitize_tag_name) {
        Some(id) if id != EMPTY_TAG_PLACEHOLDER => format!("{tag}.{id}"),
        _ => tag,
    };

    sanitize_tag_name(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_to_underscore() {
        assert_eq!(sanitize_tag_name("item  name"), "item_name");
        assert_eq!(sanitize_tag_name("a\tb\nc"), "a_b_c");
    }

    #[test]
    fn strips_invalid_characters() {
        assert_eq!(sanitize_tag_name("item<name>"), "itemname");
        assert_eq!(sanitize_tag_name("привет"), EMPTY_TAG_PLACEHOLDER);
    }

    #[test]
    fn empty_input_yields_placeholder() {
        assert_eq!(sanitize_tag_name(""), EMPTY_TAG_PLACEHOLDER);
        assert_eq!(sanitize_tag_name("   "), "_"); // whitespace collapses first
    }

    #[test]
    fn digit_start_gets_underscore_prefix() {
        assert_eq!(sanitize_tag_name("123tag"), "_123tag");
        assert_eq!(sanitize_tag_name(".hidden"), "_.hidden");
        assert_eq!(sanitize_tag_name("-dash"), "_-dash");
    }

    #[test]
    fn xml_prefix_is_reserved() {
        assert_eq!(sanitize_tag_name("xmlthing"), "_xmlthing");
        assert_eq!(sanitize_tag_name("XMLThing"), "_XMLThing");
        assert_eq!(sanitize_tag_name("xslt"), "xslt");
    }

    #[test]
    fn sanitization_is_idempotent() {
        for raw in [
            "123tag",
            "xmlfoo",
            "item name",
            "ok.already",
            "",
            "<<<>>>",
            "- leading dash",
        ] {
            let once = sanitize_tag_name(raw);
            assert_eq!(sanitize_tag_name(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn derives_composite_key_from_identifier() {
        assert_eq!(derive_key("Item", Some("shield")), "Item.shield");
        assert_eq!(derive_key("Item", Some("my shield")), "Item.my_shield");
    }

    #[test]
    fn unusable_identifier_falls_back_to_tag() {
        assert_eq!(derive_key("Item", Some("")), "Item");
        assert_eq!(derive_key("Item", Some("###")), "Item");
        assert_eq!(derive_key("Item", None), "Item");
    }

    #[test]
    fn derived_keys_are_stable_under_resanitization() {
        let key = derive_key("123tag", Some("9lives"));
        assert_eq!(sanitize_tag_name(&key), key);
        assert!(key.starts_with('_'));
    }
}
