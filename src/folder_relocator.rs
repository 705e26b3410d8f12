//! Moving stray subdirectories into the holding folder.

use crate::file_actions::{Effect, Effector};
use crate::logger::Logger;
use crate::managed_folders::ManagedFolders;
use crate::report::FolderProcessingResult;
use std::fs;
use std::path::Path;

/// Moves every immediate subdirectory of `target` that is not managed into
/// `target/<holding_name>`.
///
/// Failures are logged and collected; remaining folders are still processed.
pub fn relocate(
    target: &Path,
    holding_name: &str,
    managed: &ManagedFolders,
    effector: &dyn Effector,
    logger: &dyn Logger,
) -> FolderProcessingResult {
    let mut result = FolderProcessingResult::default();
    let holding = target.join(holding_name);

    let mut directories = match fs::read_dir(target) {
        Ok(entries) => entries
            .flatten()
            .filter(|entry| {
                entry
                    .file_type()
                    .is_ok_and(|t| t.is_dir() || (t.is_symlink() && entry.path().is_dir()))
            })
            .map(|entry| entry.path())
            .collect::<Vec<_>>(),
        Err(e) => {
            let message = format!("Could not list folders in \"{}\". Reason: {e}", target.display());
            logger.log(&format!("ERROR: {message}"));
            result.errors.push(message);
            return result;
        }
    };
    directories.sort();

    for dir in directories {
        result.folders_scanned += 1;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if managed.contains(&name) {
            log::trace!("skipping managed folder {name}");
            continue;
        }

        match effector.move_folder(&dir, &holding) {
            Ok(Effect::Applied) => result.folders_moved += 1,
            Ok(Effect::Simulated) => {}
            Err(e) => {
                let message = format!("Could not move \"{name}\". Reason: {e}");
                logger.log(&format!("WARNING: {message}"));
                result.errors.push(message);
            }
        }
    }

    result
}
