//! Flat-file student store.

use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use super::{append_file, format, read_file, rewrite_file, StudentRepository};
use crate::error::Result;
use crate::record::StudentRecord;

/// Student records kept one per line as `regno<TAB>name<TAB>m1<TAB>m2<TAB>m3`.
#[derive(Debug, Clone)]
pub struct StudentStore {
    path: PathBuf,
}

impl StudentStore {
    /// Use the student file at `path`. Nothing is read until needed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StudentRepository for StudentStore {
    /// Reading stops silently at the first malformed record; blank lines
    /// are skipped.
    fn load_all(&self) -> Result<Vec<StudentRecord>> {
        let Some(contents) = read_file(&self.path)? else {
            trace!("{} does not exist yet", self.path.display());
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(record) = format::parse_student(line) else {
                warn!(
                    "Stopped reading {} at malformed line {}",
                    self.path.display(),
                    index + 1
                );
                break;
            };
            records.push(record);
        }
        Ok(records)
    }

    fn append(&self, record: &StudentRecord) -> Result<()> {
        format::validate_student(record)?;
        append_file(&self.path, &format::format_student(record))
    }

    fn rewrite_all(&self, records: &[StudentRecord]) -> Result<()> {
        let mut contents = String::new();
        for record in records {
            format::validate_student(record)?;
            contents.push_str(&format::format_student(record));
        }
        rewrite_file(&self.path, &contents)
    }
}
