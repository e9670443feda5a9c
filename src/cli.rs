//! Command-line interface module for filefold.
//!
//! Wires the pipeline together: list the target directory, ask the
//! configured model for a filename→category mapping, plan and execute the
//! moves, persist the undo ledger, and drive undo runs. Whole-batch problems
//! (unreadable directory, failed or unparseable classification, missing
//! credentials) abort the run before anything moves; per-file problems are
//! reported and counted, never fatal.

use crate::classify::supplier_for;
use crate::config::{self, ApiConfig};
use crate::ledger::UndoLedger;
use crate::organizer::MoveExecutor;
use crate::output::OutputFormatter;
use crate::planner::{MoveIntent, plan_moves};
use crate::undo::UndoExecutor;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sort a messy directory into AI-named category folders, and undo it.
#[derive(Debug, Parser)]
#[command(name = "filefold", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify the directory's files and move them into category folders.
    Organize {
        /// Directory to organize (immediate files only, no recursion).
        directory: PathBuf,
        /// Language the model should use for folder names.
        #[arg(long, default_value = "English")]
        lang: String,
        /// Show the plan without moving anything.
        #[arg(long)]
        dry_run: bool,
        /// Persist the per-file outcome log under the log directory.
        #[arg(long)]
        save_log: bool,
        /// Alternate API credential file (default: filefold_data/api.json).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Revert the moves recorded by a previous organize run.
    Undo {
        /// Ledger file to replay (default: newest in filefold_log/undo/).
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
}

/// Executes a parsed command. All user-facing failures come back as strings.
pub fn run_cli(command: Command) -> Result<(), String> {
    match command {
        Command::Organize {
            directory,
            lang,
            dry_run,
            save_log,
            config,
        } => organize_directory(&directory, &lang, dry_run, save_log, config.as_deref()),
        Command::Undo { ledger } => undo_organization(ledger),
    }
}

fn organize_directory(
    directory: &Path,
    lang: &str,
    dry_run: bool,
    save_log: bool,
    config_path: Option<&Path>,
) -> Result<(), String> {
    if !directory.is_dir() {
        return Err(format!("{} is not a directory", directory.display()));
    }

    let filenames = list_files(directory)?;
    if filenames.is_empty() {
        OutputFormatter::info("No files to organize.");
        return Ok(());
    }

    let api_config = ApiConfig::load(config_path).map_err(|e| e.to_string())?;

    OutputFormatter::info(&format!(
        "Asking {} to categorize {} files...",
        api_config.model_type,
        filenames.len()
    ));
    let mapping = supplier_for(&api_config)
        .classify(&filenames, lang)
        .map_err(|e| e.to_string())?;

    let intents = plan_moves(&mapping, directory);
    if intents.is_empty() {
        OutputFormatter::info("Nothing to move: no mapped file still exists.");
        return Ok(());
    }

    if dry_run {
        print_dry_run(&intents);
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(intents.len() as u64);
    let report = MoveExecutor::run(directory, &intents, |_| pb.inc(1));
    pb.finish_and_clear();

    for line in report.log.lines() {
        if line.starts_with("failed: ") {
            OutputFormatter::error(line);
        } else {
            OutputFormatter::success(line);
        }
    }
    OutputFormatter::plain(&format!(
        "\nDone: moved {}/{} files.",
        report.success_count, report.total_count
    ));

    if report.success_count > 0 {
        match report.ledger.save(&config::undo_dir()) {
            Ok(path) => {
                OutputFormatter::info(&format!(
                    "Undo ledger saved to {}. Run 'filefold undo' to revert.",
                    path.display()
                ));
            }
            Err(e) => OutputFormatter::warning(&format!(
                "Could not save undo ledger, undo will not be available: {}",
                e
            )),
        }
    }

    if save_log {
        match report.log.save(&config::log_dir()) {
            Ok(path) => OutputFormatter::info(&format!("Log saved to {}", path.display())),
            Err(e) => OutputFormatter::warning(&format!("Could not save log: {}", e)),
        }
    }

    Ok(())
}

/// Names of the immediate regular files in `directory`, in directory order.
fn list_files(directory: &Path) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(directory)
        .map_err(|e| format!("Error reading directory {}: {}", directory.display(), e))?;

    let mut filenames = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            filenames.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    Ok(filenames)
}

fn print_dry_run(intents: &[MoveIntent]) {
    OutputFormatter::dry_run_notice("Files would be organized as follows:");

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    for intent in intents {
        OutputFormatter::plain(&format!(" - {} → {}/", intent.file_name, intent.category));
        *category_counts.entry(intent.category.clone()).or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&category_counts, intents.len());
    OutputFormatter::dry_run_notice("No files were modified.");
}

fn undo_organization(ledger_path: Option<PathBuf>) -> Result<(), String> {
    let path = match ledger_path {
        Some(path) => path,
        None => UndoLedger::latest(&config::undo_dir())
            .ok_or_else(|| "No undo ledger found; nothing to revert.".to_string())?,
    };

    OutputFormatter::info(&format!("Reverting moves from {}...", path.display()));

    let report = UndoExecutor::undo_from_file(&path).map_err(|e| e.to_string())?;

    OutputFormatter::plain(&format!("Restored {} files.", report.restored_files));

    if !report.skipped_files.is_empty() {
        OutputFormatter::plain(&format!("Skipped: {}", report.skipped_files.len()));
        for path in &report.skipped_files {
            OutputFormatter::plain(&format!("  - {}: no longer present", path.display()));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::plain(&format!("Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("  - {}: {}", path.display(), reason));
        }
    }

    if !report.ledger_removed {
        let reason = report
            .ledger_cleanup_error
            .as_deref()
            .unwrap_or("unknown error");
        OutputFormatter::warning(&format!(
            "Could not delete the undo ledger ({}); remove {} by hand to avoid replaying it.",
            reason,
            path.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "x").expect("Failed to write file");
        fs::write(base.join("b.txt"), "y").expect("Failed to write file");
        fs::create_dir(base.join("nested")).expect("Failed to create dir");

        let mut names = list_files(base).expect("Failed to list files");
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_list_files_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(list_files(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_organize_rejects_non_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").expect("Failed to write file");

        let result = organize_directory(&file, "English", false, false, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_undo_without_ledger_is_an_error() {
        // Explicit path to a ledger that does not exist.
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = undo_organization(Some(temp_dir.path().join("undo_x.json")));
        assert!(result.is_err());
    }
}
