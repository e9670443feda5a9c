//! Move planning: turns a category mapping into concrete move intents.
//!
//! Planning is a pure transformation over the mapping and the current
//! filesystem state. It never touches the filesystem beyond existence
//! checks and never fails: file names the supplier mentioned that are no
//! longer present on disk are simply skipped.

use crate::classify::CategoryMapping;
use std::path::{Path, PathBuf};

/// A planned, not-yet-executed relocation of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// The bare file name, as listed in the mapping.
    pub file_name: String,
    /// The category label the supplier assigned. Passed through unmodified;
    /// the executor is responsible for path safety.
    pub category: String,
    /// `base/file_name`; must be a regular file at planning time.
    pub source_path: PathBuf,
    /// `base/category`; created by the executor if absent.
    pub dest_dir: PathBuf,
    /// `base/category/file_name`; the file keeps its name.
    pub dest_path: PathBuf,
}

/// Plans moves for every mapping entry whose file still exists.
///
/// Entries are visited in mapping order and the output preserves that
/// order. An entry whose `base/filename` is not an existing regular file
/// produces no intent and no error: the supplier may name files that were
/// already moved or deleted externally.
pub fn plan_moves(mapping: &CategoryMapping, base_dir: &Path) -> Vec<MoveIntent> {
    let mut intents = Vec::new();

    for (file_name, category) in mapping {
        let source_path = base_dir.join(file_name);
        if !source_path.is_file() {
            continue;
        }

        let dest_dir = base_dir.join(category);
        let dest_path = dest_dir.join(file_name);

        intents.push(MoveIntent {
            file_name: file_name.clone(),
            category: category.clone(),
            source_path,
            dest_dir,
            dest_path,
        });
    }

    intents
}
