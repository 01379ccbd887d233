/// Maps source file paths to the logical mod that owns them
use std::path::{Component, Path, PathBuf};

/// Mod name for files sitting directly in the collection root when no parent
/// directory name is usable.
pub const ROOT_FALLBACK: &str = "RootOrUncategorized";

/// Mod name for files outside the collection root with no usable parent.
pub const UNKNOWN_CONTEXT: &str = "UnknownModContext";

/// Resolves the mod that owns `file_path` given the collection root.
///
/// The mod is the first directory segment of the path relative to `root`.
/// Files directly in the root fall back to the root's own directory name;
/// files outside the root fall back to their parent directory name. Always
/// returns a non-empty string.
pub fn locate_mod(file_path: &Path, root: &Path) -> String {
    let file_path = dunce::simplified(file_path);
    let root = dunce::simplified(root);

    let relative = file_path.strip_prefix(root).ok().or_else(|| {
        // A "." root never prefixes plain relative paths like "ModA/file.xml".
        if root == Path::new(".") && file_path.is_relative() {
            Some(file_path)
        } else {
            None
        }
    });

    match relative {
        Some(relative) => {
            let mut segments = relative.components().filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            });
            match (segments.next(), segments.next()) {
                // Nested at least one directory deep: the first segment is the mod.
                (Some(first), Some(_)) => first.to_string(),
                _ => parent_name(file_path).unwrap_or_else(|| ROOT_FALLBACK.to_string()),
            }
        }
        None => parent_name(file_path).unwrap_or_else(|| UNKNOWN_CONTEXT.to_string()),
    }
}

fn parent_name(path: &Path) -> Option<String> {
    let name = path.parent()?.file_name()?.to_str()?;
    if name.is_empty() || name == "." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Lexically normalized display form of a path, used for provenance comments
/// and frequency-report samples. Collapses `.` segments without touching the
/// filesystem.
pub fn normalized_display(path: &Path) -> String {
    let normalized: PathBuf = dunce::simplified(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalized.display().to_string()
    }
}
