//! Collision-free destination paths.

use std::path::{Path, PathBuf};

/// Returns `intended` if nothing exists there, otherwise the first free
/// `"{stem} ({n}){ext}"` sibling counting up from 1.
///
/// The extension starts at the last dot of the name, so `.gitignore` becomes
/// ` (1).gitignore`. A trailing dot is not an extension and is dropped:
/// `notes.` becomes `notes (1)`.
///
/// Looks at the filesystem on every call, so it must be called right before
/// the move or copy that claims the path.
pub fn unique_path(intended: &Path) -> PathBuf {
    if !intended.exists() {
        return intended.to_path_buf();
    }

    let directory = intended.parent().unwrap_or_else(|| Path::new(""));
    let name = intended
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let (stem, extension) = split_extension(&name);

    (1u64..)
        .map(|counter| directory.join(format!("{stem} ({counter}){extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| intended.to_path_buf())
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => (&name[..dot], &name[dot..]),
        Some(dot) => (&name[..dot], ""),
        None => (name, ""),
    }
}
