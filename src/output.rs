//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! messages, styling of organizer log lines, the per-phase run report and the
//! summary table. Library code never prints directly; it logs through
//! [`crate::logger::Logger`] and the binary decides how things look here.

use crate::report::OrganizationResult;
use colored::*;
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - The end-of-run report and summary table
pub struct OutputFormatter;

impl OutputFormatter {
    fn status_line(symbol: ColoredString, message: &str) -> String {
        format!("{symbol} {message}")
    }

    /// Prints `message` after a green checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rulesort::output::OutputFormatter;
    /// OutputFormatter::success("Organization complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{}", Self::status_line("✓".green().bold(), message));
    }

    /// Prints `message` to stderr after a red cross.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rulesort::output::OutputFormatter;
    /// OutputFormatter::error("Organization completed with errors.");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{}", Self::status_line("✗".red().bold(), message));
    }

    pub fn warning(message: &str) {
        println!("{}", Self::status_line("⚠".yellow(), message));
    }

    /// Target and configuration details shown before a run.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{message}");
    }

    /// Section title of the end-of-run output, preceded by a blank line.
    pub fn header(title: &str) {
        println!("\n{}", title.bold().underline());
    }

    /// Colors one organizer log line for the terminal.
    ///
    /// `ERROR:` lines are red, `WARNING:` and `[DRY RUN]` lines yellow and
    /// phase headers bold. Anything else is returned unchanged.
    pub fn styled_log_line(message: &str) -> String {
        let trimmed = message.trim_start();
        if trimmed.starts_with("ERROR:") {
            message.red().to_string()
        } else if trimmed.starts_with("WARNING:") || trimmed.starts_with("[DRY RUN]") {
            message.yellow().to_string()
        } else if trimmed.starts_with("---") {
            message.bold().to_string()
        } else {
            message.to_string()
        }
    }

    /// Prints what each phase of a run did, followed by every error.
    pub fn print_report(result: &OrganizationResult) {
        Self::header("REPORT");

        if let Some(files) = &result.file_processing {
            let failed = files.actions_taken.iter().filter(|a| !a.success).count();
            println!(
                "Files:      {} scanned, {} handled, {} failed",
                files.files_scanned,
                (files.actions_taken.len() - failed).to_string().green(),
                Self::count_colored(failed)
            );
        }
        if let Some(folders) = &result.folder_processing {
            println!(
                "Folders:    {} scanned, {} moved, {} failed",
                folders.folders_scanned,
                folders.folders_moved.to_string().green(),
                Self::count_colored(folders.errors.len())
            );
        }
        if let Some(duplicates) = &result.duplicate_check {
            println!(
                "Duplicates: {} scanned, {} hashed, {} sets, {} deleted",
                duplicates.files_scanned,
                duplicates.files_hashed,
                duplicates.duplicate_sets_found,
                duplicates.duplicate_files_deleted.to_string().green()
            );
        }
        println!("Elapsed:    {:.2?}", result.elapsed);

        let errors = result.all_errors();
        if !errors.is_empty() {
            Self::header("ERRORS");
            for error in errors {
                println!("  {} {}", "✗".red(), error);
            }
        }
    }

    fn count_colored(count: usize) -> ColoredString {
        if count == 0 {
            count.to_string().normal()
        } else {
            count.to_string().red()
        }
    }

    /// Prints a summary table with file counts by destination folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rulesort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Photos".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(destination_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_name_len = destination_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(11); // "Destination"

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = max_name_len
        );
        println!("{}", "-".repeat(max_name_len + 10));

        for (destination, count) in destination_counts {
            println!(
                "{:<width$} | {} {}",
                destination,
                count.to_string().green(),
                Self::file_word(*count),
                width = max_name_len
            );
        }

        println!("{}", "-".repeat(max_name_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            Self::file_word(total_files),
            width = max_name_len
        );
    }

    fn file_word(count: usize) -> &'static str {
        if count == 1 { "file" } else { "files" }
    }

    /// Closing reminder after a dry run, styled like the dry-run log lines.
    pub fn dry_run_notice(message: &str) {
        println!("{}", Self::styled_log_line(&format!("[DRY RUN] {message}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_log_line_keeps_text() {
        colored::control::set_override(false);

        for line in [
            "ERROR: Target directory not found: /x",
            "WARNING: Could not move \"a\". Reason: denied",
            "[DRY RUN] Would MOVE file: \"a.txt\" -> \"Others/a.txt\"",
            "\n--- Processing Files ---",
            "Moving file: \"a.txt\" -> \"Others\"",
        ] {
            assert_eq!(OutputFormatter::styled_log_line(line), line);
        }
    }

    #[test]
    fn test_status_line_puts_symbol_first() {
        colored::control::set_override(false);

        assert_eq!(
            OutputFormatter::status_line("✓".green(), "Report written"),
            "✓ Report written"
        );
    }
}
