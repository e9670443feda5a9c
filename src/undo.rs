/// Undo execution: replays a ledger to restore the original layout.
///
/// Records are processed in the order they were recorded. Each file is moved
/// back from its destination to its recorded source; directories this run
/// created are removed once they end up empty. Per-record failures never
/// abort the pass, and the persisted ledger is deleted after a full pass
/// regardless of individual errors so the same run is never replayed twice.
use crate::ledger::{LedgerError, LedgerResult, MoveRecord, UndoLedger};
use std::fs;
use std::path::{Path, PathBuf};

/// The outcome of one undo pass.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Files moved back to their recorded source.
    pub restored_files: usize,
    /// Destinations that no longer existed when the pass reached them.
    pub skipped_files: Vec<PathBuf>,
    /// Per-file failures as (destination, error text).
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Whether the persisted ledger file was removed after the pass.
    /// Always true for in-memory undo.
    pub ledger_removed: bool,
    /// Why the ledger file could not be removed, when it could not.
    pub ledger_cleanup_error: Option<String>,
}

impl UndoReport {
    /// True when every record was restored and the ledger file is gone.
    pub fn is_complete_success(&self) -> bool {
        self.skipped_files.is_empty() && self.failed_restores.is_empty() && self.ledger_removed
    }
}

/// Reverses the moves recorded by a previous organize run.
pub struct UndoExecutor;

impl UndoExecutor {
    /// Replays an in-memory ledger.
    ///
    /// Each record is handled independently: a missing destination is a
    /// skip, a failed rename is recorded and the pass continues. Directory
    /// cleanup runs after every record, so a category directory that
    /// received several files is removed by whichever record drains it last.
    pub fn undo(ledger: &UndoLedger) -> UndoReport {
        let mut report = UndoReport {
            ledger_removed: true,
            ..UndoReport::default()
        };

        for record in &ledger.operations {
            if !record.dest.exists() {
                report.skipped_files.push(record.dest.clone());
            } else {
                match fs::rename(&record.dest, &record.src) {
                    Ok(()) => report.restored_files += 1,
                    Err(e) => report
                        .failed_restores
                        .push((record.dest.clone(), e.to_string())),
                }
            }

            cleanup_created_dir(record);
        }

        report
    }

    /// Loads a persisted ledger, replays it, then deletes the ledger file.
    ///
    /// The file is deleted even when individual records failed, so one run
    /// is never replayed. A delete failure is reported in the result without
    /// affecting the restore counts.
    pub fn undo_from_file(path: &Path) -> LedgerResult<UndoReport> {
        let ledger = UndoLedger::load(path)?;
        let mut report = Self::undo(&ledger);

        match UndoLedger::delete(path) {
            Ok(()) => report.ledger_removed = true,
            Err(LedgerError::DeleteFailed { source }) => {
                report.ledger_removed = false;
                report.ledger_cleanup_error = Some(source.to_string());
            }
            Err(e) => {
                report.ledger_removed = false;
                report.ledger_cleanup_error = Some(e.to_string());
            }
        }

        Ok(report)
    }
}

/// Removes the record's destination directory when this run created it and
/// it is empty now.
///
/// Idempotent by construction: a directory that is already gone, was not
/// created by this run, or still holds files is left alone without error.
fn cleanup_created_dir(record: &MoveRecord) {
    if !record.dir_created {
        return;
    }

    let Some(dir) = record.dest.parent() else {
        return;
    };

    if dir.exists() && dir_is_empty(dir) {
        // A concurrent writer could repopulate the directory between the
        // check and the removal; the failed removal is then the right
        // outcome and is ignored.
        let _ = fs::remove_dir(dir);
    }
}

fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
