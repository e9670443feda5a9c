//! Session log: the human-readable transcript of one run.
//!
//! One line per processed file, in processing order. The log lives in memory
//! during the run and can optionally be persisted under the log directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ordered per-file outcome lines for one organize run.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    entries: Vec<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful move as `{filename} → {category}`.
    pub fn success(&mut self, file_name: &str, category: &str) {
        self.entries.push(format!("{} → {}", file_name, category));
    }

    /// Records a failed move, keeping the error text.
    pub fn failure(&mut self, file_name: &str, error: &str) {
        self.entries.push(format!("failed: {} → {}", file_name, error));
    }

    /// All outcome lines in append order.
    pub fn lines(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the transcript to `log_dir/log_<timestamp>.txt`, creating the
    /// directory if needed. Returns the path written.
    pub fn save(&self, log_dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(log_dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = log_dir.join(format!("log_{}.txt", timestamp));
        fs::write(&path, self.entries.join("\n"))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lines_keep_append_order() {
        let mut log = SessionLog::new();
        log.success("a.pdf", "documents");
        log.failure("b.jpg", "permission denied");
        log.success("c.txt", "documents");

        assert_eq!(log.len(), 3);
        assert_eq!(log.lines()[0], "a.pdf → documents");
        assert_eq!(log.lines()[1], "failed: b.jpg → permission denied");
        assert_eq!(log.lines()[2], "c.txt → documents");
    }

    #[test]
    fn test_save_writes_newline_joined_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_dir = temp_dir.path().join("logs");

        let mut log = SessionLog::new();
        log.success("a.pdf", "文档");
        log.success("b.jpg", "图片");

        let path = log.save(&log_dir).expect("Failed to save log");
        let content = fs::read_to_string(&path).expect("Failed to read log");
        assert_eq!(content, "a.pdf → 文档\nb.jpg → 图片");
    }

    #[test]
    fn test_empty_log() {
        let log = SessionLog::new();
        assert!(log.is_empty());
        assert!(log.lines().is_empty());
    }
}
