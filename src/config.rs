//! Organizer rules and their configuration files.
//!
//! A configuration is an ordered list of rules plus the names of two folders the
//! organizer owns: the fallback folder for unmatched files and the holding folder
//! for stray subdirectories. Rules are evaluated in order; the first one whose
//! conditions all hold decides what happens to a file.
//!
//! # Configuration File Format
//!
//! TOML is the default format. JSON is used when the file name ends in `.json`.
//!
//! ```toml
//! others_folder_name = "Others"
//! subfolders_folder_name = "Folders"
//!
//! [[rules]]
//! action = "Delete"
//! [rules.conditions]
//! extensions = [".tmp", ".bak"]
//!
//! [[rules]]
//! action = "Move"
//! destination_folder = "Archive/Old Files"
//! [rules.conditions]
//! older_than_days = 365
//! ```
//!
//! The JSON layout written by earlier tools (`Rules`, `DestinationFolder`,
//! `fileNameContains`, `minSizeMB`, ...) is accepted as well.

use crate::managed_folders::same_name_ignoring_case;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name used for a configuration living next to the files it organizes.
pub const DEFAULT_CONFIG_NAME: &str = "config.toml";

/// Configuration file names that are never organized when found in the target.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.toml", "config.json"];

/// Errors that can occur while loading, validating or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file {} has invalid format: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Could not serialize configuration: {0}")]
    Serialize(String),

    #[error("Configuration file {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do with a file once a rule matched it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleAction {
    #[default]
    #[serde(alias = "move", alias = "MOVE")]
    Move,
    #[serde(alias = "copy", alias = "COPY")]
    Copy,
    #[serde(alias = "delete", alias = "DELETE")]
    Delete,
}

impl RuleAction {
    /// Upper-case verb used in dry-run previews.
    pub fn verb(&self) -> &'static str {
        match self {
            RuleAction::Move => "MOVE",
            RuleAction::Copy => "COPY",
            RuleAction::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RuleAction::Move => "Move",
            RuleAction::Copy => "Copy",
            RuleAction::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Conditions a file must satisfy for a rule to apply.
///
/// Every present condition must hold. Missing conditions, and empty lists,
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Dot-prefixed extensions, compared case-insensitively (e.g. ".jpg").
    #[serde(default, alias = "Extensions", skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Keywords of which at least one must appear in the file name.
    #[serde(
        default,
        alias = "fileNameContains",
        alias = "FileNameContains",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_name_contains: Option<Vec<String>>,

    /// Minimum age in whole days since the last modification.
    #[serde(
        default,
        alias = "olderThanDays",
        alias = "OlderThanDays",
        skip_serializing_if = "Option::is_none"
    )]
    pub older_than_days: Option<u32>,

    /// Minimum size in MiB.
    #[serde(
        default,
        alias = "minSizeMB",
        alias = "minSizeMb",
        alias = "MinSizeMb",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_size_mb: Option<u64>,
}

/// A single organizing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, alias = "Action")]
    pub action: RuleAction,

    /// Destination relative to the target directory. Ignored for deletes.
    #[serde(
        default,
        alias = "DestinationFolder",
        alias = "destinationFolder",
        skip_serializing_if = "String::is_empty"
    )]
    pub destination_folder: String,

    #[serde(default, alias = "Conditions")]
    pub conditions: RuleConditions,
}

impl Rule {
    /// Top-level folder this rule writes into, if any.
    ///
    /// `Archive/Old Files` yields `Archive`; `./Photos` yields `Photos`.
    pub fn top_level_folder(&self) -> Option<&str> {
        self.destination_folder
            .split(['/', '\\'])
            .find(|segment| !matches!(segment.trim(), "" | "."))
    }
}

/// Full organizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Folder receiving files no rule matched.
    #[serde(
        default = "default_others_folder_name",
        alias = "OthersFolderName",
        alias = "othersFolderName"
    )]
    pub others_folder_name: String,

    /// Folder receiving stray subdirectories of the target.
    #[serde(
        default = "default_subfolders_folder_name",
        alias = "SubfoldersFolderName",
        alias = "subfoldersFolderName"
    )]
    pub subfolders_folder_name: String,

    /// Ordered rules; the first match wins.
    #[serde(default, alias = "Rules")]
    pub rules: Vec<Rule>,
}

fn default_others_folder_name() -> String {
    "Others".to_string()
}

fn default_subfolders_folder_name() -> String {
    "Folders".to_string()
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            others_folder_name: default_others_folder_name(),
            subfolders_folder_name: default_subfolders_folder_name(),
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

fn move_rule(destination: &str, extensions: &[&str]) -> Rule {
    Rule {
        action: RuleAction::Move,
        destination_folder: destination.to_string(),
        conditions: RuleConditions {
            extensions: Some(extensions.iter().map(|e| e.to_string()).collect()),
            ..Default::default()
        },
    }
}

impl OrganizerConfig {
    /// Load configuration, falling back to the built-in template.
    ///
    /// Attempts, in order:
    /// 1. `config_path`, if provided
    /// 2. `config.toml` in the current directory
    /// 3. `~/.config/rulesort/config.toml`
    /// 4. [`OrganizerConfig::default_template`]
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read, parsed or validated.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(DEFAULT_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("rulesort")
                .join(DEFAULT_CONFIG_NAME);
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        log::warn!("no configuration file found, using the built-in rules");
        Ok(Self::default_template())
    }

    /// Load and validate configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content, ConfigFormat::for_path(path)).map_err(|reason| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        config.validate()?;
        log::debug!(
            "loaded {} rules from {}",
            config.rules.len(),
            path.display()
        );
        Ok(config)
    }

    fn parse(content: &str, format: ConfigFormat) -> Result<Self, String> {
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Serialize in the format implied by `path`.
    pub fn to_string_for(&self, path: &Path) -> Result<String, ConfigError> {
        match ConfigFormat::for_path(path) {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Write the default template to `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyExists` if the file exists and `overwrite`
    /// is false.
    pub fn write_default(path: &Path, overwrite: bool) -> Result<(), ConfigError> {
        if path.exists() && !overwrite {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        let content = Self::default_template().to_string_for(path)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check folder names, destinations and extensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, name) in [
            ("others_folder_name", &self.others_folder_name),
            ("subfolders_folder_name", &self.subfolders_folder_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{label} must not be empty")));
            }
            if name.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!(
                    "{label} '{name}' must be a single folder name"
                )));
            }
        }

        if same_name_ignoring_case(&self.others_folder_name, &self.subfolders_folder_name) {
            return Err(ConfigError::Invalid(
                "others_folder_name and subfolders_folder_name must differ".to_string(),
            ));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let number = index + 1;
            if rule.action != RuleAction::Delete {
                if rule.top_level_folder().is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "rule {number} ({}) needs a destination_folder",
                        rule.action
                    )));
                }
                let destination = Path::new(&rule.destination_folder);
                let escapes = destination
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
                if escapes {
                    return Err(ConfigError::Invalid(format!(
                        "rule {number} destination '{}' must be a relative path inside the target",
                        rule.destination_folder
                    )));
                }
            }

            if let Some(extensions) = &rule.conditions.extensions
                && let Some(bad) = extensions.iter().find(|e| !e.starts_with('.'))
            {
                return Err(ConfigError::Invalid(format!(
                    "rule {number} extension '{bad}' must start with '.'"
                )));
            }
        }

        Ok(())
    }

    /// The rule set written by `rulesort init`.
    pub fn default_template() -> Self {
        Self {
            others_folder_name: default_others_folder_name(),
            subfolders_folder_name: default_subfolders_folder_name(),
            rules: vec![
                Rule {
                    action: RuleAction::Delete,
                    destination_folder: String::new(),
                    conditions: RuleConditions {
                        extensions: Some(vec![
                            ".tmp".to_string(),
                            ".bak".to_string(),
                            ".log".to_string(),
                        ]),
                        ..Default::default()
                    },
                },
                Rule {
                    action: RuleAction::Copy,
                    destination_folder: "Backups".to_string(),
                    conditions: RuleConditions {
                        file_name_contains: Some(vec!["important".to_string()]),
                        ..Default::default()
                    },
                },
                Rule {
                    action: RuleAction::Move,
                    destination_folder: "Archive/Old Files".to_string(),
                    conditions: RuleConditions {
                        older_than_days: Some(365),
                        ..Default::default()
                    },
                },
                Rule {
                    action: RuleAction::Move,
                    destination_folder: "Large Files".to_string(),
                    conditions: RuleConditions {
                        min_size_mb: Some(1024),
                        ..Default::default()
                    },
                },
                move_rule(
                    "Photos",
                    &[
                        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".heic", ".svg", ".ai",
                        ".eps", ".psd", ".tiff", ".cr2", ".nef", ".orf", ".sr2",
                    ],
                ),
                move_rule(
                    "Archives",
                    &[
                        ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".iso", ".img", ".dmg",
                    ],
                ),
                move_rule(
                    "Documents",
                    &[
                        ".pdf", ".docx", ".doc", ".xlsx", ".xls", ".pptx", ".ppt", ".txt", ".rtf",
                        ".odt", ".ods", ".md", ".csv", ".epub", ".mobi",
                    ],
                ),
                move_rule("Executables", &[".exe", ".msi", ".jar"]),
                move_rule("Scripts", &[".bat", ".cmd", ".ps1", ".sh"]),
                move_rule(
                    "Videos",
                    &[".mp4", ".mov", ".avi", ".mkv", ".webm", ".wmv", ".flv"],
                ),
                move_rule("Audio", &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a"]),
                move_rule(
                    "Source Code",
                    &[
                        ".html", ".css", ".js", ".ts", ".jsx", ".tsx", ".php", ".scss", ".less",
                        ".vue", ".c", ".h", ".cpp", ".hpp", ".cs", ".csproj", ".sln", ".vb",
                        ".java", ".kt", ".swift", ".py", ".go", ".rs", ".rb", ".pl", ".sql",
                        ".json", ".xml", ".yml", ".yaml", ".toml", ".dockerfile", ".gitignore",
                    ],
                ),
            ],
        }
    }
}
