/// Move execution: applies planned moves and records everything needed to
/// undo them.
///
/// Intents are processed strictly in order, one at a time. A failing move is
/// captured as a session-log line and never aborts the batch; a succeeding
/// move produces exactly one ledger record. The executor itself never
/// returns an error to the caller: the caller gets counts, a transcript,
/// and the ledger.
use crate::ledger::{MoveRecord, UndoLedger};
use crate::planner::MoveIntent;
use crate::session::SessionLog;
use std::fs;
use std::path::{Path, PathBuf};

/// What one organize pass produced.
#[derive(Debug)]
pub struct RunReport {
    /// Files actually moved.
    pub success_count: usize,
    /// Intents processed (successes plus failures).
    pub total_count: usize,
    /// One outcome line per intent, in processing order.
    pub log: SessionLog,
    /// One record per successful move. `ledger.len() == success_count`.
    pub ledger: UndoLedger,
}

/// Errors for a single move attempt. Captured per file, never propagated
/// out of the batch.
#[derive(Debug)]
pub enum OrganizeError {
    /// The category label cannot be used as a directory name.
    UnsafeCategory { category: String },
    /// The file name is not a plain single path segment.
    UnsafeFileName { name: String },
    /// Failed to create the category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move the file into its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsafeCategory { category } => {
                write!(f, "Category '{}' is not a safe directory name", category)
            }
            Self::UnsafeFileName { name } => {
                write!(f, "File name '{}' is not a plain file name", name)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for single move attempts.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Windows device names that must not become directory names anywhere.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Executes planned moves against the filesystem.
pub struct MoveExecutor;

impl MoveExecutor {
    /// Processes every intent in order and reports the outcome.
    ///
    /// `after_each` is invoked once per intent after it has been attempted,
    /// whether it succeeded or failed (used by the CLI for progress display).
    pub fn run<F>(target_dir: &Path, intents: &[MoveIntent], mut after_each: F) -> RunReport
    where
        F: FnMut(&MoveIntent),
    {
        let mut report = RunReport {
            success_count: 0,
            total_count: intents.len(),
            log: SessionLog::new(),
            ledger: UndoLedger::new(target_dir),
        };

        for intent in intents {
            match Self::execute_intent(intent) {
                Ok(record) => {
                    report.log.success(&intent.file_name, &intent.category);
                    report.success_count += 1;
                    report.ledger.push(record);
                }
                Err(e) => {
                    report.log.failure(&intent.file_name, &e.to_string());
                }
            }
            after_each(intent);
        }

        report
    }

    /// Attempts one move: create the category directory if absent, then
    /// rename the file into it. Returns the ledger record on success.
    ///
    /// `dir_created` is decided from the directory's existence immediately
    /// before this move, per operation: when several files land in one new
    /// category in the same batch, each record carries its own observation.
    fn execute_intent(intent: &MoveIntent) -> OrganizeResult<MoveRecord> {
        if !is_safe_segment(&intent.category) {
            return Err(OrganizeError::UnsafeCategory {
                category: intent.category.clone(),
            });
        }
        if !is_safe_segment(&intent.file_name) {
            return Err(OrganizeError::UnsafeFileName {
                name: intent.file_name.clone(),
            });
        }

        let dir_exists_before = intent.dest_dir.exists();

        // Only the single category level is created; the base directory is
        // assumed to exist already.
        if !dir_exists_before {
            fs::create_dir(&intent.dest_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: intent.dest_dir.clone(),
                source: e,
            })?;
        }

        fs::rename(&intent.source_path, &intent.dest_path).map_err(|e| {
            OrganizeError::FileMoveFailure {
                source: intent.source_path.clone(),
                destination: intent.dest_path.clone(),
                source_error: e,
            }
        })?;

        Ok(MoveRecord {
            src: intent.source_path.clone(),
            dest: intent.dest_path.clone(),
            dir_created: !dir_exists_before,
        })
    }
}

/// Checks that a supplier-provided string is usable as one path segment.
///
/// Category labels come straight from the model and must never escape the
/// base directory or name a reserved device.
fn is_safe_segment(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return false;
    }

    // "CON" and "con.txt" are both reserved on Windows.
    let stem = name.split('.').next().unwrap_or(name);
    !RESERVED_NAMES
        .iter()
        .any(|r| stem.eq_ignore_ascii_case(r))
}
