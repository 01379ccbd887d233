/// Source-tree walking with format classification and skip rules
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Declarative markup read with a structural parser.
    Markup,
    /// Script source read via textual pattern matching.
    Script,
}

impl SourceKind {
    /// Classify a file by extension; `None` for anything the pipeline
    /// does not read.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "xml" => Some(Self::Markup),
            "lua" => Some(Self::Script),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Maximum file size in bytes (default: 20MB).
    #[serde(default = "default_max_size")]
    pub max_file_size: u64,

    /// Path fragments that exclude a file or directory, matched
    /// case-insensitively against the path relative to the scan root.
    #[serde(default = "default_skip_fragments")]
    pub skip_fragments: Vec<String>,

    /// Binary detection threshold (fraction of control bytes in the head of
    /// the file).
    #[serde(default = "default_binary_threshold")]
    pub binary_threshold: f32,
}

fn default_max_size() -> u64 {
    20 * 1024 * 1024
}

fn default_skip_fragments() -> Vec<String> {
    vec![".git".to_string(), "__pycache__".to_string()]
}

fn default_binary_threshold() -> f32 {
    0.20
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
            skip_fragments: default_skip_fragments(),
            binary_threshold: default_binary_threshold(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Walks `root` collecting markup and script files. The root must be
    /// readable; unreadable entries below it are logged and skipped so a
    /// single bad directory cannot abort a whole collection scan.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>, std::io::Error> {
        let mut files = Vec::new();
        self.scan_recursive(root, root, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn scan_recursive(
        &self,
        root: &Path,
        current: &Path,
        files: &mut Vec<ScannedFile>,
    ) -> Result<(), std::io::Error> {
        let entries = match fs::read_dir(current) {
            Ok(entries) => entries,
            Err(err) if current != root => {
                log::warn!("skipping unreadable directory {}: {}", current.display(), err);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable entry under {}: {}", current.display(), err);
                    continue;
                }
            };
            let path = entry.path();

            let relative = path
                .strip_prefix(root)
                .ok()
                .and_then(|p| p.to_str())
                .unwrap_or("");
            if self.is_skipped(relative) {
                continue;
            }

            if path.is_dir() {
                self.scan_recursive(root, &path, files)?;
            } else if path.is_file() {
                if let Some(scanned) = self.classify(&path) {
                    files.push(scanned);
                }
            }
        }
        Ok(())
    }

    fn classify(&self, path: &Path) -> Option<ScannedFile> {
        let kind = SourceKind::from_path(path)?;

        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                log::warn!("cannot stat {}: {}", path.display(), err);
                return None;
            }
        };
        if size > self.config.max_file_size {
            log::warn!("skipping oversized file {} ({} bytes)", path.display(), size);
            return None;
        }

        match self.looks_binary(path) {
            Ok(true) => {
                log::warn!("skipping binary-looking file {}", path.display());
                None
            }
            Ok(false) => Some(ScannedFile {
                path: path.to_path_buf(),
                kind,
                size,
            }),
            Err(err) => {
                log::warn!("cannot read {}: {}", path.display(), err);
                None
            }
        }
    }

    fn is_skipped(&self, relative: &str) -> bool {
        let lowered = relative.to_ascii_lowercase();
        self.config
            .skip_fragments
            .iter()
            .any(|fragment| lowered.contains(&fragment.to_ascii_lowercase()))
    }

    fn looks_binary(&self, path: &Path) -> Result<bool, std::io::Error> {
        let content = fs::read(path)?;
        if content.is_empty() {
            return Ok(false);
        }

        // Sniff the first 8KB for control bytes.
        let sample = &content[..content.len().min(8192)];
        let control = sample
            .iter()
            .filter(|&&b| b < 32 && b != b'\n' && b != b'\r' && b != b'\t')
            .count();

        Ok(control as f32 / sample.len() as f32 > self.config.binary_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(
            SourceKind::from_path(Path::new("a/b.xml")),
            Some(SourceKind::Markup)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("a/b.LUA")),
            Some(SourceKind::Script)
        );
        assert_eq!(SourceKind::from_path(Path::new("a/b.png")), None);
        assert_eq!(SourceKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn scans_markup_and_script_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ModA")).unwrap();
        fs::write(dir.path().join("ModA/items.xml"), "<infotexts/>").unwrap();
        fs::write(dir.path().join("ModA/init.lua"), "local x = 1").unwrap();
        fs::write(dir.path().join("ModA/icon.png"), [0u8; 16]).unwrap();

        let scanner = FileScanner::new(ScanConfig::default());
        let files = scanner.scan(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.kind == SourceKind::Markup));
        assert!(files.iter().any(|f| f.kind == SourceKind::Script));
    }

    #[test]
    fn skips_binary_content_with_recognized_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.xml"), vec![0u8; 256]).unwrap();

        let scanner = FileScanner::new(ScanConfig::default());
        let files = scanner.scan(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn skips_configured_fragments() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/junk.xml"), "<a/>").unwrap();
        fs::create_dir(dir.path().join("Mod")).unwrap();
        fs::write(dir.path().join("Mod/ok.xml"), "<a/>").unwrap();

        let scanner = FileScanner::new(ScanConfig::default());
        let files = scanner.scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("Mod/ok.xml"));
    }
}
