//! Outcome records produced by an organizer run.
//!
//! Every phase folds its work into one immutable result value; the run wraps
//! them into an [`OrganizationResult`].

use crate::config::RuleAction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// The outcome of one file's move, copy or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedFileAction {
    pub original_path: PathBuf,
    pub action: RuleAction,
    /// Where the file ended up. `None` for deletes and early failures.
    pub destination_path: Option<PathBuf>,
    pub success: bool,
    pub message: String,
}

impl ProcessedFileAction {
    pub fn succeeded(
        original_path: &Path,
        action: RuleAction,
        destination_path: Option<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            original_path: original_path.to_path_buf(),
            action,
            destination_path,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(original_path: &Path, action: RuleAction, message: impl Into<String>) -> Self {
        Self {
            original_path: original_path.to_path_buf(),
            action,
            destination_path: None,
            success: false,
            message: message.into(),
        }
    }
}

/// Result of the file classification phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileProcessingResult {
    pub files_scanned: usize,
    pub actions_taken: Vec<ProcessedFileAction>,
    pub errors: Vec<String>,
}

impl FileProcessingResult {
    /// Count of outcomes per destination folder name, with deletes under
    /// `"(deleted)"`. Failed actions are left out.
    pub fn counts_by_destination(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for action in self.actions_taken.iter().filter(|a| a.success) {
            let key = match (&action.action, &action.destination_path) {
                (RuleAction::Delete, _) | (_, None) => "(deleted)".to_string(),
                (_, Some(path)) => path
                    .parent()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

/// Result of moving stray subdirectories into the holding folder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderProcessingResult {
    pub folders_scanned: usize,
    pub folders_moved: usize,
    pub errors: Vec<String>,
}

/// Result of the duplicate check over the managed folders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateCheckResult {
    /// Every file seen, including empty ones.
    pub files_scanned: usize,
    /// Non-empty files whose content was hashed.
    pub files_hashed: usize,
    pub duplicate_sets_found: usize,
    pub duplicate_files_deleted: usize,
    pub errors: Vec<String>,
}

/// The report of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationResult {
    pub success: bool,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub file_processing: Option<FileProcessingResult>,
    pub folder_processing: Option<FolderProcessingResult>,
    pub duplicate_check: Option<DuplicateCheckResult>,
}

/// Errors while exporting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrganizationResult {
    /// Every error of every phase, in phase order.
    pub fn all_errors(&self) -> Vec<&str> {
        let files = self.file_processing.iter().flat_map(|r| r.errors.iter());
        let folders = self.folder_processing.iter().flat_map(|r| r.errors.iter());
        let duplicates = self.duplicate_check.iter().flat_map(|r| r.errors.iter());
        files
            .chain(folders)
            .chain(duplicates)
            .map(String::as_str)
            .collect()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
