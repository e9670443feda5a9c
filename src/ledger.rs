/// Undo ledger: the persisted record of one organization run.
///
/// Every successful move appends a [`MoveRecord`]; the completed ledger is
/// written to the undo directory as one JSON file per run, named after the
/// run timestamp. Undo consumes the ledger and deletes the file afterward.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One successfully executed move, as stored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Where the file lived before the move.
    pub src: PathBuf,
    /// Where the file lives after the move.
    pub dest: PathBuf,
    /// Whether the destination directory did not exist immediately before
    /// this move was attempted. Recorded per operation, never recomputed.
    pub dir_created: bool,
}

/// A complete organization run, persisted to enable undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoLedger {
    /// Run timestamp in `YYYYMMDD-HHMMSS` form; also names the ledger file.
    pub timestamp: String,
    /// The directory the run organized, as given by the user.
    pub target_dir: String,
    /// Records in execution order, one per successful move.
    pub operations: Vec<MoveRecord>,
}

impl UndoLedger {
    /// Creates an empty ledger for a run starting now.
    pub fn new(target_dir: &Path) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y%m%d-%H%M%S").to_string(),
            target_dir: target_dir.to_string_lossy().to_string(),
            operations: Vec::new(),
        }
    }

    /// Appends a record for a move that succeeded.
    pub fn push(&mut self, record: MoveRecord) {
        self.operations.push(record);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The file name this ledger is stored under.
    pub fn file_name(&self) -> String {
        format!("undo_{}.json", self.timestamp)
    }

    /// Writes the ledger to `undo_dir`, creating the directory if needed.
    ///
    /// The write is all-or-nothing from a reader's perspective: the JSON is
    /// written to a temporary file in the same directory and renamed into
    /// place, so no reader can observe a truncated ledger.
    pub fn save(&self, undo_dir: &Path) -> LedgerResult<PathBuf> {
        fs::create_dir_all(undo_dir).map_err(|e| LedgerError::WriteFailed { source: e })?;

        let json = serde_json::to_string_pretty(self).map_err(|e| LedgerError::WriteFailed {
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            ),
        })?;

        let final_path = undo_dir.join(self.file_name());
        let tmp_path = undo_dir.join(format!("{}.tmp", self.file_name()));

        fs::write(&tmp_path, json).map_err(|e| LedgerError::WriteFailed { source: e })?;
        fs::rename(&tmp_path, &final_path).map_err(|e| LedgerError::WriteFailed { source: e })?;

        Ok(final_path)
    }

    /// Reads a ledger back from disk.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        if !path.exists() {
            return Err(LedgerError::NotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path).map_err(|e| LedgerError::ReadFailed { source: e })?;

        serde_json::from_str(&json).map_err(|e| LedgerError::InvalidFormat {
            reason: e.to_string(),
        })
    }

    /// Removes a persisted ledger file. Missing files are not an error.
    pub fn delete(path: &Path) -> LedgerResult<()> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| LedgerError::DeleteFailed { source: e })?;
        }
        Ok(())
    }

    /// Returns the most recent ledger file in `undo_dir`, if any.
    ///
    /// Ledger names embed the run timestamp, so the lexicographically
    /// greatest name is the newest run.
    pub fn latest(undo_dir: &Path) -> Option<PathBuf> {
        let entries = fs::read_dir(undo_dir).ok()?;

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("undo_") && n.ends_with(".json"))
            })
            .max()
    }
}

/// Errors raised by ledger persistence.
#[derive(Debug)]
pub enum LedgerError {
    /// No ledger file exists at the given path.
    NotFound(PathBuf),
    /// Failed to write the ledger file.
    WriteFailed { source: std::io::Error },
    /// Failed to read the ledger file.
    ReadFailed { source: std::io::Error },
    /// Failed to delete the ledger file.
    DeleteFailed { source: std::io::Error },
    /// The file is not a valid ledger.
    InvalidFormat { reason: String },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "No undo ledger found at {}", path.display()),
            Self::WriteFailed { source } => write!(f, "Failed to write undo ledger: {}", source),
            Self::ReadFailed { source } => write!(f, "Failed to read undo ledger: {}", source),
            Self::DeleteFailed { source } => write!(f, "Failed to delete undo ledger: {}", source),
            Self::InvalidFormat { reason } => write!(f, "Invalid undo ledger format: {}", reason),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_ledger() -> UndoLedger {
        let mut ledger = UndoLedger::new(Path::new("/tmp/target"));
        ledger.push(MoveRecord {
            src: PathBuf::from("/tmp/target/a.pdf"),
            dest: PathBuf::from("/tmp/target/docs/a.pdf"),
            dir_created: true,
        });
        ledger.push(MoveRecord {
            src: PathBuf::from("/tmp/target/b.jpg"),
            dest: PathBuf::from("/tmp/target/images/b.jpg"),
            dir_created: false,
        });
        ledger
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ledger = sample_ledger();

        let path = ledger.save(temp_dir.path()).expect("Failed to save ledger");
        assert!(path.exists());

        let loaded = UndoLedger::load(&path).expect("Failed to load ledger");
        assert_eq!(loaded.timestamp, ledger.timestamp);
        assert_eq!(loaded.target_dir, ledger.target_dir);
        assert_eq!(loaded.operations.len(), 2);
        assert_eq!(loaded.operations[0].src, ledger.operations[0].src);
        assert!(loaded.operations[0].dir_created);
        assert!(!loaded.operations[1].dir_created);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ledger = sample_ledger();

        ledger.save(temp_dir.path()).expect("Failed to save ledger");

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .expect("Failed to read dir")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0], ledger.file_name());
    }

    #[test]
    fn test_save_creates_undo_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let undo_dir = temp_dir.path().join("log").join("undo");

        let path = sample_ledger().save(&undo_dir).expect("Failed to save ledger");
        assert!(undo_dir.is_dir());
        assert!(path.starts_with(&undo_dir));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = UndoLedger::load(&temp_dir.path().join("undo_nope.json"));
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_load_reports_missing_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("undo_20250101-000000.json");
        fs::write(&path, r#"{"timestamp": "20250101-000000", "operations": []}"#)
            .expect("Failed to write file");

        match UndoLedger::load(&path) {
            Err(LedgerError::InvalidFormat { reason }) => {
                assert!(reason.contains("target_dir"), "unexpected reason: {}", reason);
            }
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let ledger = sample_ledger();
        let json = serde_json::to_string(&ledger).expect("Failed to serialize");

        let value: serde_json::Value = serde_json::from_str(&json).expect("Failed to parse");
        assert!(value.get("timestamp").is_some());
        assert!(value.get("target_dir").is_some());
        let op = &value["operations"][0];
        assert!(op.get("src").is_some());
        assert!(op.get("dest").is_some());
        assert!(op.get("dir_created").is_some());
    }

    #[test]
    fn test_latest_picks_newest_timestamp() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for ts in ["20240101-000000", "20250615-120000", "20241231-235959"] {
            fs::write(temp_dir.path().join(format!("undo_{}.json", ts)), "{}")
                .expect("Failed to write file");
        }
        fs::write(temp_dir.path().join("notes.txt"), "ignore me").expect("Failed to write file");

        let latest = UndoLedger::latest(temp_dir.path()).expect("Expected a ledger");
        assert_eq!(
            latest.file_name().unwrap().to_string_lossy(),
            "undo_20250615-120000.json"
        );
    }

    #[test]
    fn test_latest_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(UndoLedger::latest(temp_dir.path()).is_none());
        assert!(UndoLedger::latest(&temp_dir.path().join("missing")).is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = sample_ledger().save(temp_dir.path()).expect("Failed to save ledger");

        UndoLedger::delete(&path).expect("Failed to delete ledger");
        assert!(!path.exists());
        UndoLedger::delete(&path).expect("Second delete should be a no-op");
    }
}
