/// Existing-translation index: which keys each mod already covers
///
/// Built as a full pre-pass over every markup file before any suppression
/// decision is made. Interleaving indexing with filtering would let a source
/// file be judged against a half-built picture of existing coverage, so the
/// two phases stay strictly ordered.
use crate::extract::xml;
use crate::scanner::{FileScanner, ScannedFile, SourceKind};
use crate::{encoding, mods};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Default)]
pub struct TranslationIndex {
    keys_by_mod: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Markup files visited during the pre-pass.
    pub files_visited: usize,
    /// Files that failed to open or parse and were skipped.
    pub files_failed: usize,
    /// Mods with at least one indexed key.
    pub mods_indexed: usize,
    /// Total keys indexed across all mods.
    pub keys_indexed: usize,
}

impl TranslationIndex {
    /// Walks `root` and indexes the keys of every markup document declared in
    /// `existing_language`. Unreadable or malformed files are reported through
    /// the returned diagnostics and skipped.
    pub fn build(
        root: &Path,
        existing_language: &str,
        scanner: &FileScanner,
    ) -> Result<(Self, IndexStats, Vec<String>), std::io::Error> {
        let files = scanner.scan(root)?;
        let mut index = Self::default();
        let mut stats = IndexStats::default();
        let mut diagnostics = Vec::new();

        for file in files.iter().filter(|f| f.kind == SourceKind::Markup) {
            stats.files_visited += 1;
            if let Err(message) = index.index_file(file, root, existing_language) {
                stats.files_failed += 1;
                log::warn!("{message}");
                diagnostics.push(message);
            }
        }

        stats.mods_indexed = index.keys_by_mod.len();
        stats.keys_indexed = index.keys_by_mod.values().map(HashSet::len).sum();
        Ok((index, stats, diagnostics))
    }

    fn index_file(
        &mut self,
        file: &ScannedFile,
        root: &Path,
        existing_language: &str,
    ) -> Result<(), String> {
        let content = encoding::read_text_file(&file.path)
            .map_err(|e| format!("index: cannot read {}: {e}", file.path.display()))?;
        let keys = xml::collect_keys(&content, existing_language)
            .map_err(|e| format!("index: cannot parse {}: {e}", file.path.display()))?;

        if !keys.is_empty() {
            let mod_name = mods::locate_mod(&file.path, root);
            self.keys_by_mod.entry(mod_name).or_default().extend(keys);
        }
        Ok(())
    }

    /// True when `key` is already translated in `mod_name`.
    pub fn contains(&self, mod_name: &str, key: &str) -> bool {
        self.keys_by_mod
            .get(mod_name)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    pub fn mods(&self) -> usize {
        self.keys_by_mod.len()
    }

    pub fn total_keys(&self) -> usize {
        self.keys_by_mod.values().map(HashSet::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, mod_name: &str, key: &str) {
        self.keys_by_mod
            .entry(mod_name.to_string())
            .or_default()
            .insert(key.to_string());
    }
}
