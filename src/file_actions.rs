//! Filesystem effects of an organizer run.
//!
//! Everything that changes the filesystem goes through an [`Effector`]. A run
//! picks one implementation up front: [`ActionExecutor`] performs the work,
//! [`DryRunEffector`] only logs and reports what would happen. Callers count
//! and report identically in both modes.
//!
//! File actions never return errors. A failed move, copy or delete is logged
//! with a `WARNING:` prefix and comes back as a failed [`ProcessedFileAction`].

use crate::config::RuleAction;
use crate::logger::Logger;
use crate::path_allocator::unique_path;
use crate::report::ProcessedFileAction;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A resolved action for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Move into this destination folder.
    Move(PathBuf),
    /// Copy into this destination folder.
    Copy(PathBuf),
    Delete,
}

impl PlannedAction {
    pub fn action(&self) -> RuleAction {
        match self {
            PlannedAction::Move(_) => RuleAction::Move,
            PlannedAction::Copy(_) => RuleAction::Copy,
            PlannedAction::Delete => RuleAction::Delete,
        }
    }
}

/// Whether an effect touched the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Applied,
    Simulated,
}

/// Performs (or pretends to perform) every filesystem change of a run.
pub trait Effector {
    fn move_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction;

    fn copy_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction;

    fn delete_file(&self, file: &Path) -> ProcessedFileAction;

    /// Moves `dir` with its contents into `holding`. An existing folder of the
    /// same name inside `holding` is an error, never a merge.
    fn move_folder(&self, dir: &Path, holding: &Path) -> io::Result<Effect>;

    fn remove_duplicate(&self, file: &Path) -> io::Result<Effect>;

    /// Runs the planned action for `file`.
    fn apply(&self, file: &Path, plan: &PlannedAction) -> ProcessedFileAction {
        match plan {
            PlannedAction::Move(folder) => self.move_file(file, folder),
            PlannedAction::Copy(folder) => self.copy_file(file, folder),
            PlannedAction::Delete => self.delete_file(file),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_name(path: &Path) -> io::Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name component", path.display()),
        )
    })
}

/// Renames `from` to `to`, copying and removing the source when the two are
/// on different devices.
fn rename_or_copy(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            let source_size = fs::metadata(from)?.len();
            fs::copy(from, to)?;

            let copied_size = fs::metadata(to)?.len();
            if copied_size != source_size {
                let _ = fs::remove_file(to);
                return Err(io::Error::other(format!(
                    "copy verification failed: source {source_size} bytes, destination {copied_size} bytes"
                )));
            }
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

/// Applies actions to the filesystem.
pub struct ActionExecutor<'a> {
    logger: &'a dyn Logger,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }

    /// Creates `dest_folder`, claims a free name in it and hands both paths
    /// to `transfer`.
    fn transfer_into(
        file: &Path,
        dest_folder: &Path,
        transfer: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> io::Result<PathBuf> {
        fs::create_dir_all(dest_folder)?;
        let destination = unique_path(&dest_folder.join(file_name(file)?));
        transfer(file, &destination)?;
        Ok(destination)
    }

    fn finish_transfer(
        &self,
        file: &Path,
        dest_folder: &Path,
        action: RuleAction,
        outcome: io::Result<PathBuf>,
    ) -> ProcessedFileAction {
        let (verb, past, infinitive) = match action {
            RuleAction::Copy => ("Copying", "Copied", "copy"),
            _ => ("Moving", "Moved", "move"),
        };
        let name = display_name(file);

        match outcome {
            Ok(destination) => {
                self.logger.log(&format!(
                    "{verb} file: \"{name}\" -> \"{}\"",
                    display_name(dest_folder)
                ));
                let message = format!("{past} to {}", destination.display());
                ProcessedFileAction::succeeded(file, action, Some(destination), message)
            }
            Err(e) => {
                self.logger.log(&format!(
                    "WARNING: Could not {infinitive} \"{name}\". Reason: {e}"
                ));
                ProcessedFileAction::failed(file, action, format!("Failed to {infinitive}: {e}"))
            }
        }
    }
}

impl Effector for ActionExecutor<'_> {
    fn move_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction {
        let outcome = Self::transfer_into(file, dest_folder, rename_or_copy);
        self.finish_transfer(file, dest_folder, RuleAction::Move, outcome)
    }

    fn copy_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction {
        let outcome =
            Self::transfer_into(file, dest_folder, |from, to| fs::copy(from, to).map(|_| ()));
        self.finish_transfer(file, dest_folder, RuleAction::Copy, outcome)
    }

    fn delete_file(&self, file: &Path) -> ProcessedFileAction {
        let name = display_name(file);
        match fs::remove_file(file) {
            Ok(()) => {
                self.logger.log(&format!("Deleting file: \"{name}\""));
                ProcessedFileAction::succeeded(file, RuleAction::Delete, None, "Deleted successfully")
            }
            Err(e) => {
                self.logger.log(&format!(
                    "WARNING: Could not delete \"{name}\". Reason: {e}"
                ));
                ProcessedFileAction::failed(file, RuleAction::Delete, format!("Failed to delete: {e}"))
            }
        }
    }

    fn move_folder(&self, dir: &Path, holding: &Path) -> io::Result<Effect> {
        let target = holding.join(file_name(dir)?);
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("\"{}\" already exists", target.display()),
            ));
        }

        fs::create_dir_all(holding)?;
        fs::rename(dir, &target)?;
        self.logger.log(&format!(
            "Moving folder: \"{}\" -> \"{}\"",
            display_name(dir),
            display_name(holding)
        ));
        Ok(Effect::Applied)
    }

    fn remove_duplicate(&self, file: &Path) -> io::Result<Effect> {
        fs::remove_file(file)?;
        self.logger
            .log(&format!("Deleted duplicate: \"{}\"", file.display()));
        Ok(Effect::Applied)
    }
}

/// Reports what [`ActionExecutor`] would do without touching anything.
///
/// Destinations are previewed as `dest_folder/<file name>`. Name collisions
/// are not resolved, so a preview can differ from the path a live run picks.
pub struct DryRunEffector<'a> {
    logger: &'a dyn Logger,
}

impl<'a> DryRunEffector<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }

    fn simulate(
        &self,
        file: &Path,
        action: RuleAction,
        dest_folder: Option<&Path>,
    ) -> ProcessedFileAction {
        let destination = dest_folder.map(|folder| match file.file_name() {
            Some(name) => folder.join(name),
            None => folder.to_path_buf(),
        });
        let target_info = destination
            .as_ref()
            .map(|d| format!(" -> \"{}\"", d.display()))
            .unwrap_or_default();
        let message = format!(
            "[DRY RUN] Would {} file: \"{}\"{target_info}",
            action.verb(),
            file.display()
        );

        self.logger.log(&message);
        ProcessedFileAction::succeeded(file, action, destination, message)
    }
}

impl Effector for DryRunEffector<'_> {
    fn move_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction {
        self.simulate(file, RuleAction::Move, Some(dest_folder))
    }

    fn copy_file(&self, file: &Path, dest_folder: &Path) -> ProcessedFileAction {
        self.simulate(file, RuleAction::Copy, Some(dest_folder))
    }

    fn delete_file(&self, file: &Path) -> ProcessedFileAction {
        self.simulate(file, RuleAction::Delete, None)
    }

    fn move_folder(&self, dir: &Path, holding: &Path) -> io::Result<Effect> {
        self.logger.log(&format!(
            "[DRY RUN] Would move folder: \"{}\" -> \"{}\"",
            dir.display(),
            holding.display()
        ));
        Ok(Effect::Simulated)
    }

    fn remove_duplicate(&self, file: &Path) -> io::Result<Effect> {
        self.logger.log(&format!(
            "[DRY RUN] Would DELETE duplicate: \"{}\"",
            file.display()
        ));
        Ok(Effect::Simulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use tempfile::TempDir;

    #[test]
    fn test_move_creates_nested_destination() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);

        let file = temp_dir.path().join("old.txt");
        fs::write(&file, "content").unwrap();
        let folder = temp_dir.path().join("Archive").join("Old Files");

        let outcome = executor.move_file(&file, &folder);

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.action, RuleAction::Move);
        assert_eq!(outcome.destination_path, Some(folder.join("old.txt")));
        assert!(!file.exists());
        assert!(folder.join("old.txt").exists());
        assert_eq!(
            logger.count_containing(&["Moving file: \"old.txt\" -> \"Old Files\""]),
            1
        );
    }

    #[test]
    fn test_move_renames_on_collision() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let folder = temp_dir.path().join("Documents");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("report.pdf"), "existing").unwrap();

        let file = temp_dir.path().join("report.pdf");
        fs::write(&file, "incoming").unwrap();

        let outcome = executor.move_file(&file, &folder);

        assert_eq!(outcome.destination_path, Some(folder.join("report (1).pdf")));
        assert_eq!(fs::read_to_string(folder.join("report.pdf")).unwrap(), "existing");
        assert_eq!(
            fs::read_to_string(folder.join("report (1).pdf")).unwrap(),
            "incoming"
        );
    }

    #[test]
    fn test_copy_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);

        let file = temp_dir.path().join("important.doc");
        fs::write(&file, "content").unwrap();
        let folder = temp_dir.path().join("Backups");

        let outcome = executor.apply(&file, &PlannedAction::Copy(folder.clone()));

        assert!(outcome.success);
        assert_eq!(outcome.action, RuleAction::Copy);
        assert!(file.exists());
        assert!(folder.join("important.doc").exists());
        assert_eq!(logger.count_containing(&["Copying file:"]), 1);
    }

    #[test]
    fn test_delete_has_no_destination() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);

        let file = temp_dir.path().join("scratch.tmp");
        fs::write(&file, "content").unwrap();

        let outcome = executor.apply(&file, &PlannedAction::Delete);

        assert!(outcome.success);
        assert_eq!(outcome.destination_path, None);
        assert!(!file.exists());
        assert_eq!(logger.count_containing(&["Deleting file: \"scratch.tmp\""]), 1);
    }

    #[test]
    fn test_failures_become_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let missing = temp_dir.path().join("missing.txt");

        let moved = executor.move_file(&missing, &temp_dir.path().join("Others"));
        let deleted = executor.delete_file(&missing);

        assert!(!moved.success);
        assert!(moved.message.starts_with("Failed to move:"));
        assert_eq!(moved.destination_path, None);
        assert!(!deleted.success);
        assert!(deleted.message.starts_with("Failed to delete:"));
        assert_eq!(logger.count_containing(&["WARNING: Could not"]), 2);
    }

    #[test]
    fn test_move_folder_refuses_to_merge() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let holding = temp_dir.path().join("Folders");
        fs::create_dir_all(holding.join("project")).unwrap();
        let dir = temp_dir.path().join("project");
        fs::create_dir(&dir).unwrap();

        let err = executor.move_folder(&dir, &holding).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(dir.exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let effector = DryRunEffector::new(&logger);

        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, "content").unwrap();
        let dir = temp_dir.path().join("project");
        fs::create_dir(&dir).unwrap();
        let folder = temp_dir.path().join("Photos");

        let moved = effector.apply(&file, &PlannedAction::Move(folder.clone()));
        let deleted = effector.apply(&file, &PlannedAction::Delete);
        let folder_effect = effector
            .move_folder(&dir, &temp_dir.path().join("Folders"))
            .unwrap();
        let duplicate_effect = effector.remove_duplicate(&file).unwrap();

        assert!(moved.success);
        assert_eq!(moved.destination_path, Some(folder.join("photo.jpg")));
        assert!(deleted.success);
        assert_eq!(deleted.destination_path, None);
        assert_eq!(folder_effect, Effect::Simulated);
        assert_eq!(duplicate_effect, Effect::Simulated);

        assert!(file.exists());
        assert!(dir.exists());
        assert!(!folder.exists());
        assert!(!temp_dir.path().join("Folders").exists());

        assert_eq!(logger.count_containing(&["[DRY RUN] Would MOVE file:"]), 1);
        assert_eq!(logger.count_containing(&["[DRY RUN] Would DELETE file:"]), 1);
        assert_eq!(logger.count_containing(&["[DRY RUN] Would move folder:"]), 1);
        assert_eq!(
            logger.count_containing(&["[DRY RUN] Would DELETE duplicate:"]),
            1
        );
    }
}
