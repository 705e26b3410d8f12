//! Log sinks for organizer runs.
//!
//! The organizer reports every phase transition, action, warning and dry-run
//! preview as a single line of text through the [`Logger`] trait. Lines use
//! fixed verbs (`Moving`, `Copying`, `Deleting`), the `[DRY RUN]` marker and
//! `WARNING:` / `ERROR:` prefixes so that callers can match on them.

use crate::output::OutputFormatter;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// A sink for organizer messages.
pub trait Logger {
    fn log(&self, message: &str);
}

/// Prints messages to the terminal above a spinner and optionally mirrors
/// them into a log file.
pub struct ConsoleLogger {
    spinner: ProgressBar,
    log_file: Option<RefCell<File>>,
}

impl ConsoleLogger {
    /// Creates a console logger without a log file.
    pub fn new() -> Self {
        let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));

        Self {
            spinner,
            log_file: None,
        }
    }

    /// Creates a console logger that also appends to `path`.
    ///
    /// Parent directories are created as needed and a session header is
    /// written before the first message.
    pub fn with_log_file(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "\n--- Log session started at {} ---",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        let mut logger = Self::new();
        logger.log_file = Some(RefCell::new(file));
        Ok(logger)
    }

    /// Stops the spinner and removes it from the terminal.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        let header = message.trim();
        if header.starts_with("---") {
            self.spinner.set_message(header.trim_matches('-').trim().to_string());
        }
        let line = OutputFormatter::styled_log_line(message);
        // a hidden bar (stdout not a terminal) swallows println
        if self.spinner.is_hidden() {
            println!("{line}");
        } else {
            self.spinner.println(line);
        }

        if let Some(file) = &self.log_file
            && let Err(e) = writeln!(file.borrow_mut(), "{message}")
        {
            log::warn!("could not write to log file: {e}");
        }
    }
}

impl Drop for ConsoleLogger {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: RefCell<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages logged so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Number of logged messages containing every given fragment.
    pub fn count_containing(&self, fragments: &[&str]) -> usize {
        self.lines
            .borrow()
            .iter()
            .filter(|line| fragments.iter().all(|f| line.contains(f)))
            .count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}
