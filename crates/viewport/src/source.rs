use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file flowing through a build pipeline.
///
/// `history` holds every path the file has had, the original one first.
/// A null file carries no contents (typically a directory) and is passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    history: Vec<PathBuf>,
    null: bool,
    modified: Option<SystemTime>,
    original_modified: Option<SystemTime>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            history: vec![path.into()],
            null: false,
            modified: None,
            original_modified: None,
        }
    }

    pub fn null(path: impl Into<PathBuf>) -> Self {
        Self {
            null: true,
            ..Self::new(path)
        }
    }

    /// Builds an entry from the file system. Directories become null entries.
    pub fn from_disk(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = fs_err::metadata(&path)?;
        let modified = metadata.modified().ok();

        Ok(Self {
            history: vec![path],
            null: !metadata.is_file(),
            modified,
            original_modified: modified,
        })
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        if self.original_modified.is_none() {
            self.original_modified = Some(modified);
        }
        self
    }

    /// Records that a build stage rewrote the file, possibly under a new
    /// path.
    pub fn transformed(mut self, path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        let path = path.into();
        if self.history.last() != Some(&path) {
            self.history.push(path);
        }
        self.modified = Some(modified);
        self
    }

    pub fn path(&self) -> &Path {
        self.history.last().map(PathBuf::as_path).unwrap_or(Path::new(""))
    }

    pub fn original_path(&self) -> &Path {
        self.history.first().map(PathBuf::as_path).unwrap_or(Path::new(""))
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Whether an earlier stage changed this file: its timestamp moved away
    /// from the original one or it went through more than one path.
    pub fn is_changed(&self) -> bool {
        self.modified != self.original_modified || self.history.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fresh_file_is_unchanged() {
        let file = SourceFile::new("src/a.css").with_modified(SystemTime::UNIX_EPOCH);
        assert!(!file.is_changed());
        assert_eq!(file.path(), Path::new("src/a.css"));
    }

    #[test]
    fn new_timestamp_marks_change() {
        let file = SourceFile::new("src/a.css")
            .with_modified(SystemTime::UNIX_EPOCH)
            .with_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(5));
        assert!(file.is_changed());
    }

    #[test]
    fn renamed_file_keeps_original_path() {
        let file = SourceFile::new("src/main.less")
            .transformed("build/css/main.css", SystemTime::UNIX_EPOCH);

        assert!(file.is_changed());
        assert_eq!(file.original_path(), Path::new("src/main.less"));
        assert_eq!(file.path(), Path::new("build/css/main.css"));
    }

    #[test]
    fn directories_are_null() {
        let dir = assert_fs::TempDir::new().unwrap();
        let entry = SourceFile::from_disk(dir.path()).unwrap();
        assert!(entry.is_null());
    }
}
