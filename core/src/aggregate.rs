/// Deduplication, suppression and per-mod frequency accounting
///
/// Every raw occurrence is counted and sampled BEFORE any drop decision, so
/// the frequency report reflects true scan volume. That ordering is what lets
/// the report surface tags that are wildly frequent yet contribute nothing to
/// the worklist, which is exactly the signal used to grow the exclusion list.
use crate::extract::TextEntry;
use crate::index::TranslationIndex;
use crate::scanner::SourceKind;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<(String, String, String)>,
    occurrences: HashMap<(String, String), usize>,
    samples: HashMap<(String, String), BTreeSet<(String, String)>>,
    worklist: Vec<TextEntry>,
    suppressed_translated: usize,
    suppressed_duplicates: usize,
}

/// One row of the frequency report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequentTag {
    pub mod_name: String,
    pub key: String,
    pub count: usize,
    pub unique_texts: usize,
    pub unique_files: usize,
    /// Up to three `(text, path)` samples, deterministically ordered.
    pub samples: Vec<(String, String)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw scan result through counting, suppression and
    /// deduplication, in that order.
    pub fn observe(&mut self, entry: TextEntry, kind: SourceKind, index: &TranslationIndex) {
        let stat_key = (entry.mod_name.clone(), entry.key.clone());
        *self.occurrences.entry(stat_key.clone()).or_insert(0) += 1;
        self.samples
            .entry(stat_key)
            .or_default()
            .insert((entry.text.clone(), entry.source_path.clone()));

        // Script sources carry no language attribute, so presence in the
        // existing-translation index can never suppress them.
        let already_translated =
            kind == SourceKind::Markup && index.contains(&entry.mod_name, &entry.key);
        if already_translated {
            self.suppressed_translated += 1;
            return;
        }

        let dedup_key = (
            entry.mod_name.clone(),
            entry.key.clone(),
            entry.text.clone(),
        );
        if self.seen.contains(&dedup_key) {
            self.suppressed_duplicates += 1;
            return;
        }

        self.seen.insert(dedup_key);
        self.worklist.push(entry);
    }

    /// Total raw occurrences observed, including dropped ones.
    pub fn raw_entries(&self) -> usize {
        self.occurrences.values().sum()
    }

    pub fn suppressed_translated(&self) -> usize {
        self.suppressed_translated
    }

    pub fn suppressed_duplicates(&self) -> usize {
        self.suppressed_duplicates
    }

    pub fn worklist_len(&self) -> usize {
        self.worklist.len()
    }

    /// Consumes the surviving entries, sorted case-insensitively by
    /// `(mod, key, text)`.
    pub fn into_worklist(self) -> Vec<TextEntry> {
        let mut worklist = self.worklist;
        worklist.sort_by(|a, b| {
            (
                a.mod_name.to_lowercase(),
                a.key.to_lowercase(),
                a.text.to_lowercase(),
            )
                .cmp(&(
                    b.mod_name.to_lowercase(),
                    b.key.to_lowercase(),
                    b.text.to_lowercase(),
                ))
        });
        worklist
    }

    /// Keys at or above `threshold` raw occurrences within one mod, sorted by
    /// mod, then descending count, then key.
    pub fn frequent_tags(&self, threshold: usize) -> Vec<FrequentTag> {
        let mut report: Vec<FrequentTag> = self
            .occurrences
            .iter()
            .filter(|(_, &count)| threshold > 0 && count >= threshold)
            .map(|((mod_name, key), &count)| {
                let details = self
                    .samples
                    .get(&(mod_name.clone(), key.clone()))
                    .cloned()
                    .unwrap_or_default();
                let unique_texts = details
                    .iter()
                    .map(|(text, _)| text)
                    .collect::<HashSet<_>>()
                    .len();
                let unique_files = details
                    .iter()
                    .map(|(_, path)| path)
                    .collect::<HashSet<_>>()
                    .len();
                FrequentTag {
                    mod_name: mod_name.clone(),
                    key: key.clone(),
                    count,
                    unique_texts,
                    unique_files,
                    samples: details.into_iter().take(3).collect(),
                }
            })
            .collect();

        report.sort_by(|a, b| {
            (a.mod_name.to_lowercase(), std::cmp::Reverse(a.count), a.key.to_lowercase()).cmp(&(
                b.mod_name.to_lowercase(),
                std::cmp::Reverse(b.count),
                b.key.to_lowercase(),
            ))
        });
        report
    }
}
