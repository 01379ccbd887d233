/// Safe artifact writes: back up, write to temp, swap into place
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("cannot create backup: {0}")]
    Backup(String),
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Set when the target already existed and was backed up first.
    pub backup_path: Option<PathBuf>,
    pub final_path: PathBuf,
}

/// Writes `contents` to `target`, keeping a timestamped `.bak` copy of any
/// file being replaced. The write goes through a temp file and a rename so a
/// failure mid-write never leaves a truncated artifact behind.
pub fn write_artifact(target: &Path, contents: &[u8]) -> Result<WriteOutcome, ArtifactError> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let backup_path = if target.exists() {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let mut name = target
            .file_name()
            .ok_or_else(|| ArtifactError::Backup("target has no file name".into()))?
            .to_os_string();
        name.push(format!(".bak.{stamp}"));
        let candidate = target.with_file_name(name);
        fs::copy(target, &candidate).map_err(|e| ArtifactError::Backup(e.to_string()))?;
        Some(candidate)
    } else {
        None
    };

    let temp_path = temp_sibling(target);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    #[cfg(target_os = "windows")]
    {
        if let Err(err) = fs::rename(&temp_path, target) {
            if err.kind() == io::ErrorKind::AlreadyExists {
                fs::remove_file(target)?;
                fs::rename(&temp_path, target)?;
            } else {
                return Err(ArtifactError::Io(err));
            }
        }
    }

    #[cfg(not(target_os = "windows"))]
    fs::rename(&temp_path, target)?;

    Ok(WriteOutcome {
        backup_path,
        final_path: target.to_path_buf(),
    })
}

fn temp_sibling(target: &Path) -> PathBuf {
    let pid = std::process::id();
    match target.file_name() {
        Some(name) => {
            let mut tmp = name.to_os_string();
            tmp.push(format!(".__tmp_{pid}"));
            target.with_file_name(tmp)
        }
        None => target.join(format!("__tmp_{pid}")),
    }
}
