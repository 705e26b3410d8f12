//! Runs a whole organization pass over a target directory.
//!
//! A run validates the target, then goes through three phases in order:
//! classify and act on files, relocate stray folders, and optionally remove
//! duplicates from the managed folders. Every phase runs to completion even
//! when an earlier one reported errors; only a missing target aborts the run.

use crate::config::{CONFIG_FILE_NAMES, OrganizerConfig, RuleAction};
use crate::duplicates;
use crate::file_actions::{ActionExecutor, DryRunEffector, Effector, PlannedAction};
use crate::folder_relocator;
use crate::logger::Logger;
use crate::managed_folders::{ManagedFolders, same_name_ignoring_case};
use crate::report::{FileProcessingResult, OrganizationResult, ProcessedFileAction};
use crate::rule_matcher::{FileFacts, RuleMatcher, walks_as_file};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Switches for one run. All default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Also organize files in subdirectories.
    pub recursive: bool,
    /// Report what would happen without changing anything.
    pub dry_run: bool,
    /// Remove duplicate copies from the managed folders afterwards.
    pub check_duplicates: bool,
}

/// Organizes directories, reporting through a [`Logger`].
pub struct Organizer<'a> {
    logger: &'a dyn Logger,
}

impl<'a> Organizer<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }

    /// Organizes `target` according to `config`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rulesort::{MemoryLogger, OrganizeOptions, Organizer, OrganizerConfig};
    /// use std::path::Path;
    ///
    /// let logger = MemoryLogger::new();
    /// let options = OrganizeOptions { dry_run: true, ..Default::default() };
    /// let result = Organizer::new(&logger).organize(
    ///     Path::new("/home/user/Downloads"),
    ///     &OrganizerConfig::default_template(),
    ///     options,
    /// );
    /// println!("{} ({:?})", result.message, result.elapsed);
    /// ```
    pub fn organize(
        &self,
        target: &Path,
        config: &OrganizerConfig,
        options: OrganizeOptions,
    ) -> OrganizationResult {
        let started_at = Utc::now();
        let stopwatch = Instant::now();

        if !target.is_dir() {
            let message = format!("ERROR: Target directory not found: {}", target.display());
            self.logger.log(&message);
            return OrganizationResult {
                success: false,
                message,
                started_at,
                elapsed: stopwatch.elapsed(),
                file_processing: None,
                folder_processing: None,
                duplicate_check: None,
            };
        }

        if options.dry_run {
            self.logger.log(
                "--- DRY RUN MODE ENABLED: No files or folders will be moved, copied, or deleted. ---",
            );
        }

        let live = ActionExecutor::new(self.logger);
        let simulated = DryRunEffector::new(self.logger);
        let effector: &dyn Effector = if options.dry_run { &simulated } else { &live };

        let managed = ManagedFolders::from_config(config);
        log::debug!("managed folders: {:?}", managed.iter().collect::<Vec<_>>());

        self.logger.log("\n--- Processing Files ---");
        let file_processing =
            self.process_files(target, config, &managed, options.recursive, effector);

        self.logger.log("\n--- Processing Folders ---");
        let folder_processing = folder_relocator::relocate(
            target,
            &config.subfolders_folder_name,
            &managed,
            effector,
            self.logger,
        );

        let duplicate_check = options.check_duplicates.then(|| {
            self.logger.log("\n--- Checking for Duplicate Files ---");
            duplicates::find_and_remove(target, &managed, effector, self.logger)
        });

        let success = file_processing.errors.is_empty()
            && folder_processing.errors.is_empty()
            && duplicate_check
                .as_ref()
                .is_none_or(|result| result.errors.is_empty());
        let message = if success {
            "Organization complete."
        } else {
            "Organization completed with errors."
        };

        OrganizationResult {
            success,
            message: message.to_string(),
            started_at,
            elapsed: stopwatch.elapsed(),
            file_processing: Some(file_processing),
            folder_processing: Some(folder_processing),
            duplicate_check,
        }
    }

    fn process_files(
        &self,
        target: &Path,
        config: &OrganizerConfig,
        managed: &ManagedFolders,
        recursive: bool,
        effector: &dyn Effector,
    ) -> FileProcessingResult {
        let mut result = FileProcessingResult::default();
        let files = self.collect_files(target, recursive, &mut result.errors);

        for file in files {
            if is_config_file(&file) {
                continue;
            }
            if recursive && parent_is_managed(&file, managed) {
                continue;
            }

            result.files_scanned += 1;

            let outcome = match FileFacts::read(&file) {
                Ok(facts) => {
                    let plan = plan_for(&facts, target, config);
                    effector.apply(&file, &plan)
                }
                Err(e) => {
                    let name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    self.logger.log(&format!(
                        "WARNING: Could not read \"{name}\". Reason: {e}"
                    ));
                    ProcessedFileAction::failed(
                        &file,
                        RuleAction::Move,
                        format!("Failed to read metadata: {e}"),
                    )
                }
            };

            if !outcome.success {
                result.errors.push(outcome.message.clone());
            }
            result.actions_taken.push(outcome);
        }

        result
    }

    /// Lists the files to consider before anything is moved, so files moved
    /// into the tree are not picked up again.
    fn collect_files(
        &self,
        target: &Path,
        recursive: bool,
        errors: &mut Vec<String>,
    ) -> Vec<PathBuf> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(target)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) if walks_as_file(&entry) => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let message =
                        format!("Could not list files in \"{}\". Reason: {e}", target.display());
                    self.logger.log(&format!("WARNING: {message}"));
                    errors.push(message);
                }
            }
        }

        files
    }
}

/// What to do with a file: its first matching rule, or a move to the
/// others folder. The clock is read once per file.
fn plan_for(facts: &FileFacts, target: &Path, config: &OrganizerConfig) -> PlannedAction {
    let now = Utc::now();
    match RuleMatcher::first_match(facts, &config.rules, now) {
        Some(rule) => {
            log::trace!("{} matched rule for {:?}", facts.name, rule.destination_folder);
            match rule.action {
                RuleAction::Move => PlannedAction::Move(target.join(&rule.destination_folder)),
                RuleAction::Copy => PlannedAction::Copy(target.join(&rule.destination_folder)),
                RuleAction::Delete => PlannedAction::Delete,
            }
        }
        None => PlannedAction::Move(target.join(&config.others_folder_name)),
    }
}

fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            CONFIG_FILE_NAMES
                .iter()
                .any(|c| same_name_ignoring_case(c, name))
        })
}

fn parent_is_managed(path: &Path, managed: &ManagedFolders) -> bool {
    path.parent()
        .and_then(|p| p.file_name())
        .is_some_and(|name| managed.contains(&name.to_string_lossy()))
}
