//! Command-line interface module for rulesort.
//!
//! ## Usage
//! ```bash
//! # Organize a directory with the config found in the usual places
//! rulesort organize ~/Downloads
//!
//! # Preview everything, including subdirectories and duplicate removal
//! rulesort organize ~/Downloads --recursive --check-duplicates --dry-run
//!
//! # Write the starter configuration
//! rulesort init config.toml
//! ```

use crate::config::{DEFAULT_CONFIG_NAME, OrganizerConfig};
use crate::logger::ConsoleLogger;
use crate::organizer::{OrganizeOptions, Organizer};
use crate::output::OutputFormatter;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// rulesort - sort a directory into folders by configurable rules
#[derive(Parser, Debug)]
#[command(name = "rulesort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Organize the files and folders of a directory
    Organize(OrganizeArgs),

    /// Write the default configuration file
    Init {
        /// Where to write it (.toml or .json)
        #[arg(default_value = DEFAULT_CONFIG_NAME)]
        path: PathBuf,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct OrganizeArgs {
    /// Directory to organize
    pub target: PathBuf,

    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also organize files inside subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Remove duplicate files from the organized folders
    #[arg(short = 'd', long)]
    pub check_duplicates: bool,

    /// Append every log line to this file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl From<&OrganizeArgs> for OrganizeOptions {
    fn from(args: &OrganizeArgs) -> Self {
        Self {
            recursive: args.recursive,
            dry_run: args.dry_run,
            check_duplicates: args.check_duplicates,
        }
    }
}

/// Runs a parsed command line.
///
/// Returns `Ok(false)` when an organize run finished with errors, so the
/// binary can exit non-zero. Setup failures (bad configuration, unwritable
/// log or report file) are returned as errors.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use rulesort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["rulesort", "organize", "/path/to/directory", "--dry-run"]);
/// match run_cli(cli) {
///     Ok(success) => println!("finished, success = {success}"),
///     Err(e) => eprintln!("Error: {e:#}"),
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Organize(args) => run_organize(&args),
        Commands::Init { path, force } => {
            run_init(&path, force, &mut io::stdin().lock())?;
            Ok(true)
        }
    }
}

/// Loads the configuration, organizes `args.target` and prints the report.
pub fn run_organize(args: &OrganizeArgs) -> Result<bool> {
    let config = OrganizerConfig::load(args.config.as_deref())
        .context("Error loading configuration")?;

    OutputFormatter::info(&format!("Organizing contents of: {}", args.target.display()));

    let logger = match &args.log_file {
        Some(path) => ConsoleLogger::with_log_file(path)
            .with_context(|| format!("Could not open log file {}", path.display()))?,
        None => ConsoleLogger::new(),
    };

    let options = OrganizeOptions::from(args);
    let result = Organizer::new(&logger).organize(&args.target, &config, options);
    logger.finish();

    if result.file_processing.is_some() {
        OutputFormatter::print_report(&result);
    }
    if let Some(files) = &result.file_processing
        && !files.actions_taken.is_empty()
    {
        let counts = files.counts_by_destination();
        let total = counts.values().sum();
        OutputFormatter::summary_table(&counts, total);
    }

    if let Some(path) = &args.report {
        result
            .write_json(path)
            .with_context(|| format!("Could not export report to {}", path.display()))?;
        OutputFormatter::plain(&format!("Report written to {}", path.display()));
    }

    println!();
    if result.success {
        OutputFormatter::success(&result.message);
    } else {
        OutputFormatter::error(&result.message);
    }
    if options.dry_run && result.file_processing.is_some() {
        OutputFormatter::dry_run_notice(&format!(
            "No files were modified. Run without --dry-run to organize {}.",
            args.target.display()
        ));
    }

    Ok(result.success)
}

/// Writes the default configuration to `path`, asking on `input` before
/// replacing an existing file unless `force` is set.
pub fn run_init(path: &Path, force: bool, input: &mut impl BufRead) -> Result<()> {
    if path.exists() && !force && !confirm_overwrite(path, input)? {
        OutputFormatter::warning("Aborted. Existing configuration left unchanged.");
        return Ok(());
    }

    OrganizerConfig::write_default(path, true)
        .with_context(|| format!("Could not write configuration to {}", path.display()))?;
    OutputFormatter::success(&format!("Default configuration written to {}", path.display()));
    Ok(())
}

fn confirm_overwrite(path: &Path, input: &mut impl BufRead) -> Result<bool> {
    print!("{} already exists. Overwrite? [y/N] ", path.display());
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
