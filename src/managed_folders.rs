//! Top-level folders the organizer treats as its own output.

use crate::config::OrganizerConfig;

/// Case-insensitive name comparison that also folds non-ASCII letters.
pub fn same_name_ignoring_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive set of managed folder names with a stable order:
/// the others folder, the holding folder, then rule destinations in rule
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedFolders {
    names: Vec<String>,
}

impl ManagedFolders {
    pub fn from_config(config: &OrganizerConfig) -> Self {
        let mut folders = Self { names: Vec::new() };
        folders.insert(&config.others_folder_name);
        folders.insert(&config.subfolders_folder_name);
        for name in config.rules.iter().filter_map(|rule| rule.top_level_folder()) {
            folders.insert(name);
        }
        folders
    }

    fn insert(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.contains(name) {
            self.names.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| same_name_ignoring_case(n, name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Rule, RuleAction};

    #[test]
    fn test_order_and_case_insensitive_dedup() {
        let config = OrganizerConfig {
            others_folder_name: "Others".to_string(),
            subfolders_folder_name: "Folders".to_string(),
            rules: vec![
                Rule {
                    destination_folder: "Photos".to_string(),
                    ..Default::default()
                },
                Rule {
                    destination_folder: "Archive/Old Files".to_string(),
                    ..Default::default()
                },
                Rule {
                    destination_folder: "photos/raw".to_string(),
                    ..Default::default()
                },
                Rule {
                    action: RuleAction::Delete,
                    ..Default::default()
                },
            ],
        };

        let managed = ManagedFolders::from_config(&config);

        assert_eq!(
            managed.iter().collect::<Vec<_>>(),
            vec!["Others", "Folders", "Photos", "Archive"]
        );
        assert!(managed.contains("PHOTOS"));
        assert!(managed.contains("archive"));
        assert!(!managed.contains("Old Files"));
        assert_eq!(managed.len(), 4);
    }

    #[test]
    fn test_non_ascii_names_ignore_case() {
        let config = OrganizerConfig {
            rules: vec![Rule {
                destination_folder: "Фото".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let managed = ManagedFolders::from_config(&config);

        assert!(managed.contains("фото"));
        assert!(managed.contains("ФОТО"));
        assert!(!managed.contains("Видео"));
    }
}
