//! rulesort - a rule-based directory organizer
//!
//! This library sorts the files of a directory into folders according to an
//! ordered list of rules, moves stray subdirectories into a holding folder,
//! and can remove duplicate files from the folders it manages. Every run can
//! be previewed as a dry run, which reports the same outcomes without
//! touching the filesystem.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod file_actions;
pub mod folder_relocator;
pub mod logger;
pub mod managed_folders;
pub mod organizer;
pub mod output;
pub mod path_allocator;
pub mod report;
pub mod rule_matcher;

pub use config::{ConfigError, OrganizerConfig, Rule, RuleAction, RuleConditions};
pub use file_actions::{ActionExecutor, DryRunEffector, Effect, Effector, PlannedAction};
pub use logger::{ConsoleLogger, Logger, MemoryLogger};
pub use managed_folders::ManagedFolders;
pub use organizer::{OrganizeOptions, Organizer};
pub use report::{
    DuplicateCheckResult, FileProcessingResult, FolderProcessingResult, OrganizationResult,
    ProcessedFileAction, ReportError,
};
pub use rule_matcher::{FileFacts, RuleMatcher};

pub use cli::{Cli, run_cli};
