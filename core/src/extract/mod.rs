/// Per-format extraction of translatable text entries
pub mod lua;
pub mod xml;

use crate::exclusions::ExclusionSet;
use crate::scanner::SourceKind;
use crate::{encoding, mods};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("markup parse error: {0}")]
    Parse(String),
}

impl From<quick_xml::Error> for ExtractError {
    fn from(err: quick_xml::Error) -> Self {
        ExtractError::Parse(err.to_string())
    }
}

/// One translatable unit. `text` is stored markup-escaped, exactly as it will
/// be written into the worklist document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub key: String,
    pub text: String,
    pub source_path: String,
    pub mod_name: String,
}

/// Extracts all translatable entries from one source file. Markup files are
/// filtered by declared language; script files are always pattern-scanned.
pub fn extract_file(
    path: &Path,
    kind: SourceKind,
    root: &Path,
    source_language: &str,
    exclusions: &ExclusionSet,
) -> Result<Vec<TextEntry>, ExtractError> {
    let content = encoding::read_text_file(path)?;
    let mod_name = mods::locate_mod(path, root);
    let source_path = mods::normalized_display(path);

    match kind {
        SourceKind::Markup => xml::extract_markup(
            &content,
            &source_path,
            &mod_name,
            source_language,
            exclusions,
        ),
        SourceKind::Script => Ok(lua::extract_script(&content, &source_path, &mod_name)),
    }
}
