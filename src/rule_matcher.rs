//! Matching files against rule conditions.

use crate::config::{Rule, RuleConditions};
use chrono::{DateTime, TimeDelta, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// The metadata a rule can look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFacts {
    pub path: PathBuf,
    /// Full file name, extension included.
    pub name: String,
    /// Extension with its leading dot, or empty.
    pub extension: String,
    pub len: u64,
    pub modified: DateTime<Utc>,
}

impl FileFacts {
    /// Reads the facts for `path` from the filesystem.
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        Ok(Self::new(path, metadata.len(), modified))
    }

    pub fn new(path: &Path, len: u64, modified: DateTime<Utc>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        // dotfiles like ".gitignore" are their own extension
        let extension = match name.rfind('.') {
            Some(dot) if dot + 1 < name.len() => name[dot..].to_string(),
            _ => String::new(),
        };

        Self {
            path: path.to_path_buf(),
            name,
            extension,
            len,
            modified,
        }
    }
}

/// Whether a walked entry is organized as a file: regular files, and symbolic
/// links that do not lead to a directory. Broken links count as files so they
/// are reported rather than skipped.
pub fn walks_as_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

pub struct RuleMatcher;

impl RuleMatcher {
    /// True if the file satisfies every condition present in `conditions`.
    pub fn matches(file: &FileFacts, conditions: &RuleConditions, now: DateTime<Utc>) -> bool {
        if let Some(extensions) = non_empty(&conditions.extensions)
            && !extensions
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(&file.extension))
        {
            return false;
        }

        if let Some(keywords) = non_empty(&conditions.file_name_contains) {
            let name = file.name.to_lowercase();
            if !keywords
                .iter()
                .any(|keyword| name.contains(&keyword.to_lowercase()))
            {
                return false;
            }
        }

        if let Some(days) = conditions.older_than_days
            && now - file.modified < TimeDelta::days(i64::from(days))
        {
            return false;
        }

        if let Some(min_mb) = conditions.min_size_mb
            && file.len < min_mb.saturating_mul(BYTES_PER_MB)
        {
            return false;
        }

        true
    }

    /// The first rule, in list order, whose conditions the file satisfies.
    pub fn first_match<'a>(
        file: &FileFacts,
        rules: &'a [Rule],
        now: DateTime<Utc>,
    ) -> Option<&'a Rule> {
        rules
            .iter()
            .find(|rule| Self::matches(file, &rule.conditions, now))
    }
}

fn non_empty(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}
