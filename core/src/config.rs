/// Configuration for the extraction and translation pipeline
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Language assumed for markup files that carry no `language` attribute.
pub const BASELINE_LANGUAGE: &str = "English";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Source language to extract from markup files.
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language whose presence in a mod marks a key as already translated.
    #[serde(default = "default_existing_language")]
    pub existing_language: String,

    /// `language` attribute written on output documents.
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// `translatedname` attribute written on output documents.
    #[serde(default = "default_translated_name")]
    pub translated_name: String,

    /// Minimum per-mod occurrence count before a key shows up in the
    /// frequency report.
    #[serde(default = "default_frequent_tag_threshold")]
    pub frequent_tag_threshold: usize,

    /// Batch size for translation requests.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Separator placed between translated and original text.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Optional exclusion file replacing the built-in excluded-tag list.
    #[serde(default)]
    pub exclusions_file: Option<PathBuf>,

    /// File-walk limits.
    #[serde(default)]
    pub scan: crate::scanner::ScanConfig,
}

fn default_source_language() -> String {
    BASELINE_LANGUAGE.to_string()
}

fn default_existing_language() -> String {
    "Russian".to_string()
}

fn default_target_language() -> String {
    "Russian".to_string()
}

fn default_translated_name() -> String {
    "Русский".to_string()
}

fn default_frequent_tag_threshold() -> usize {
    5
}

fn default_batch_size() -> usize {
    8
}

fn default_separator() -> String {
    "\n---\n".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            existing_language: default_existing_language(),
            target_language: default_target_language(),
            translated_name: default_translated_name(),
            frequent_tag_threshold: default_frequent_tag_threshold(),
            batch_size: default_batch_size(),
            separator: default_separator(),
            exclusions_file: None,
            scan: crate::scanner::ScanConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON config: {}", e))
    }

    /// Convert to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e))
    }

    /// True when `source_language` is the baseline language, i.e. files
    /// without a `language` attribute should be scanned.
    pub fn source_is_baseline(&self) -> bool {
        self.source_language.eq_ignore_ascii_case(BASELINE_LANGUAGE)
    }
}
