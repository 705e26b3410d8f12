//! Duplicate detection over the managed folders.
//!
//! Files are grouped by a 128-bit XXH3 digest of their full content. Within a
//! group the first file encountered is kept and every later one is removed.
//! Empty files are never considered duplicates of each other.

use crate::file_actions::{Effect, Effector};
use crate::logger::Logger;
use crate::managed_folders::ManagedFolders;
use crate::report::DuplicateCheckResult;
use crate::rule_matcher::walks_as_file;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use xxhash_rust::xxh3::Xxh3;

const BUFFER_SIZE: usize = 1024 * 1024;

/// Streams `path` through XXH3-128.
pub fn content_hash(path: &Path) -> io::Result<u128> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.digest128())
}

/// Paths sharing one digest, in the order they were found.
#[derive(Debug, Default)]
struct HashGroups {
    order: Vec<u128>,
    groups: HashMap<u128, Vec<PathBuf>>,
}

impl HashGroups {
    fn add(&mut self, hash: u128, path: PathBuf) {
        self.groups
            .entry(hash)
            .or_insert_with(|| {
                self.order.push(hash);
                Vec::new()
            })
            .push(path);
    }

    /// Groups with more than one member, ordered by first encounter.
    fn duplicate_sets(&self) -> impl Iterator<Item = (u128, &[PathBuf])> {
        self.order.iter().filter_map(|hash| {
            let paths = self.groups.get(hash)?;
            (paths.len() > 1).then_some((*hash, paths.as_slice()))
        })
    }
}

/// Finds duplicate files under every existing managed folder of `target` and
/// removes all but the first copy through `effector`.
pub fn find_and_remove(
    target: &Path,
    managed: &ManagedFolders,
    effector: &dyn Effector,
    logger: &dyn Logger,
) -> DuplicateCheckResult {
    let mut result = DuplicateCheckResult::default();
    let mut hashes = HashGroups::default();

    for folder_name in managed.iter() {
        let folder = target.join(folder_name);
        if !folder.is_dir() {
            continue;
        }

        let entries = WalkDir::new(&folder)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let message = format!("Could not read \"{}\". Reason: {e}", folder.display());
                    logger.log(&format!("WARNING: {message}"));
                    result.errors.push(message);
                    continue;
                }
            };
            if !walks_as_file(&entry) {
                continue;
            }

            result.files_scanned += 1;
            let path = entry.into_path();

            let len = match path.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    record_hash_failure(&path, &e, logger, &mut result);
                    continue;
                }
            };
            if len == 0 {
                continue;
            }

            match content_hash(&path) {
                Ok(hash) => {
                    result.files_hashed += 1;
                    log::trace!("{hash:032x} {}", path.display());
                    hashes.add(hash, path);
                }
                Err(e) => record_hash_failure(&path, &e, logger, &mut result),
            }
        }
    }

    for (hash, paths) in hashes.duplicate_sets() {
        result.duplicate_sets_found += 1;
        let original = paths[0]
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        logger.log(&format!(
            "Found duplicate set for hash: {hash:032X} (Original: \"{original}\")"
        ));

        for duplicate in &paths[1..] {
            match effector.remove_duplicate(duplicate) {
                Ok(Effect::Applied) => result.duplicate_files_deleted += 1,
                Ok(Effect::Simulated) => {}
                Err(e) => {
                    let message = format!(
                        "Could not delete duplicate \"{}\". Reason: {e}",
                        duplicate.display()
                    );
                    logger.log(&format!("WARNING: {message}"));
                    result.errors.push(message);
                }
            }
        }
    }

    log::debug!(
        "duplicate check: {} scanned, {} hashed, {} sets",
        result.files_scanned,
        result.files_hashed,
        result.duplicate_sets_found
    );
    result
}

fn record_hash_failure(
    path: &Path,
    error: &io::Error,
    logger: &dyn Logger,
    result: &mut DuplicateCheckResult,
) {
    logger.log(&format!(
        "WARNING: Could not compute hash for \"{}\". Reason: {error}",
        path.display()
    ));
    result
        .errors
        .push(format!("Failed to hash file: {}", path.display()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OrganizerConfig, Rule};
    use crate::file_actions::{ActionExecutor, DryRunEffector};
    use crate::logger::MemoryLogger;
    use std::fs;
    use tempfile::TempDir;

    fn managed() -> ManagedFolders {
        ManagedFolders::from_config(&OrganizerConfig {
            rules: vec![
                Rule {
                    destination_folder: "Photos".to_string(),
                    ..Default::default()
                },
                Rule {
                    destination_folder: "Documents".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
    }

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_content_hash_depends_on_content_only() {
        let temp_dir = TempDir::new().unwrap();
        let a = write(temp_dir.path(), "a.txt", "identical content");
        let b = write(temp_dir.path(), "b.bin", "identical content");
        let c = write(temp_dir.path(), "c.txt", "different content");

        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
        assert_ne!(content_hash(&a).unwrap(), content_hash(&c).unwrap());
    }

    #[test]
    fn test_keeps_first_encountered_copy() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let first = write(root, "Photos/image_a.jpg", "same");
        let across = write(root, "Documents/image_b.jpg", "same");
        let later = write(root, "Photos/image_c.jpg", "same");
        let unique = write(root, "Photos/unique.jpg", "other");

        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let result = find_and_remove(root, &managed(), &executor, &logger);

        assert!(result.errors.is_empty());
        assert_eq!(result.files_scanned, 4);
        assert_eq!(result.files_hashed, 4);
        assert_eq!(result.duplicate_sets_found, 1);
        assert_eq!(result.duplicate_files_deleted, 2);
        assert!(first.exists());
        assert!(!across.exists());
        assert!(!later.exists());
        assert!(unique.exists());
        assert_eq!(
            logger.count_containing(&["Found duplicate set for hash:", "image_a.jpg"]),
            1
        );
    }

    #[test]
    fn test_nested_files_are_scanned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let top = write(root, "Others/notes.txt", "note");
        let nested = write(root, "Others/deep/er/notes.txt", "note");

        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let result = find_and_remove(root, &managed(), &executor, &logger);

        assert_eq!(result.duplicate_sets_found, 1);
        // "deep" sorts before "notes.txt" within Others
        assert!(nested.exists());
        assert!(!top.exists());
    }

    #[test]
    fn test_empty_files_are_never_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "Photos/empty_a.jpg", "");
        let b = write(root, "Photos/empty_b.jpg", "");

        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let result = find_and_remove(root, &managed(), &executor, &logger);

        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_hashed, 0);
        assert_eq!(result.duplicate_sets_found, 0);
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn test_unmanaged_and_missing_folders_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "Downloads/a.txt", "same");
        let b = write(root, "Downloads/b.txt", "same");

        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let result = find_and_remove(root, &managed(), &executor, &logger);

        assert_eq!(result.files_scanned, 0);
        assert!(result.errors.is_empty());
        assert!(a.exists());
        assert!(b.exists());
    }

    /// Deletes nothing and fails every duplicate removal.
    struct RefusingEffector;

    impl Effector for RefusingEffector {
        fn move_file(&self, file: &Path, _: &Path) -> crate::report::ProcessedFileAction {
            unreachable!("{}", file.display())
        }

        fn copy_file(&self, file: &Path, _: &Path) -> crate::report::ProcessedFileAction {
            unreachable!("{}", file.display())
        }

        fn delete_file(&self, file: &Path) -> crate::report::ProcessedFileAction {
            unreachable!("{}", file.display())
        }

        fn move_folder(&self, dir: &Path, _: &Path) -> io::Result<Effect> {
            unreachable!("{}", dir.display())
        }

        fn remove_duplicate(&self, _: &Path) -> io::Result<Effect> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
        }
    }

    #[test]
    fn test_failed_removal_is_collected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "Photos/image_a.jpg", "same");
        let b = write(root, "Photos/image_b.jpg", "same");
        let c = write(root, "Photos/image_c.jpg", "same");

        let logger = MemoryLogger::new();
        let result = find_and_remove(root, &managed(), &RefusingEffector, &logger);

        assert_eq!(result.duplicate_sets_found, 1);
        assert_eq!(result.duplicate_files_deleted, 0);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("Could not delete duplicate"));
        assert!(result.errors[0].contains("image_b.jpg"));
        assert!(result.errors[1].contains("image_c.jpg"));
        assert!(a.exists() && b.exists() && c.exists());
        assert_eq!(
            logger.count_containing(&["WARNING: Could not delete duplicate", "read-only volume"]),
            2
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_is_a_hash_failure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let kept = write(root, "Photos/image_a.jpg", "same");
        let dup = write(root, "Photos/image_b.jpg", "same");
        let dangling = root.join("Photos").join("broken.jpg");
        std::os::unix::fs::symlink(root.join("gone.jpg"), &dangling).unwrap();

        let logger = MemoryLogger::new();
        let executor = ActionExecutor::new(&logger);
        let result = find_and_remove(root, &managed(), &executor, &logger);

        assert_eq!(result.files_scanned, 3);
        assert_eq!(result.files_hashed, 2);
        assert_eq!(
            result.errors,
            vec![format!("Failed to hash file: {}", dangling.display())]
        );
        assert_eq!(
            logger.count_containing(&["WARNING: Could not compute hash for", "broken.jpg"]),
            1
        );
        // the rest of the scan is unaffected
        assert_eq!(result.duplicate_files_deleted, 1);
        assert!(kept.exists());
        assert!(!dup.exists());
    }

    #[test]
    fn test_dry_run_counts_sets_but_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "Photos/image_a.jpg", "Duplicate content");
        let b = write(root, "Photos/image_b.jpg", "Duplicate content");

        let logger = MemoryLogger::new();
        let effector = DryRunEffector::new(&logger);
        let result = find_and_remove(root, &managed(), &effector, &logger);

        assert_eq!(result.duplicate_sets_found, 1);
        assert_eq!(result.duplicate_files_deleted, 0);
        assert!(a.exists());
        assert!(b.exists());
        assert_eq!(
            logger.count_containing(&["[DRY RUN] Would DELETE duplicate:", "image_b.jpg"]),
            1
        );
    }
}
