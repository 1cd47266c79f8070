//! Temporary file allocation for captures and downloads
//!
//! Files are created in a dedicated `snapup/` subdirectory of the system
//! temporary directory with unique timestamped names. They are tracked so a
//! run can report what it wrote, but they are never deleted by snapup: the
//! uploaded images stay available locally until the OS clears its temp
//! directory.
//!
//! # Examples
//!
//! ```
//! use snapup::util::temp_files::TempFileManager;
//!
//! let manager = TempFileManager::new();
//! let path = manager.create_temp_file("capture", "png").unwrap();
//! assert!(path.exists());
//! assert_eq!(manager.count(), 1);
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};

use crate::error::{SnapError, SnapResult};

/// Represents a tracked temporary file
#[derive(Debug, Clone)]
pub struct TempFile {
    /// Path to the temporary file
    pub path:      PathBuf,
    /// Timestamp when the file was created
    pub timestamp: DateTime<Utc>,
}

impl TempFile {
    /// Creates a new TempFile record
    pub fn new(path: PathBuf, timestamp: DateTime<Utc>) -> Self {
        Self { path, timestamp }
    }
}

/// Thread-safe temporary file allocator
///
/// Cloning shares the same registry, so concurrent tasks can allocate files
/// through clones of one manager.
#[derive(Clone, Debug)]
pub struct TempFileManager {
    dir:   PathBuf,
    files: Arc<Mutex<Vec<TempFile>>>,
}

impl TempFileManager {
    /// Creates a manager rooted at `$TEMP_DIR/snapup/`
    pub fn new() -> Self {
        Self::with_dir(std::env::temp_dir().join("snapup"))
    }

    /// Creates a manager rooted at a custom directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir:   dir.into(),
            files: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Directory new files are created in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> SnapResult<&Path> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(SnapError::IoError)?;
        }
        Ok(&self.dir)
    }

    /// Creates an empty file named `{prefix}-{timestamp}-{random}.{ext}`
    ///
    /// The file persists after the manager is dropped.
    pub fn create_temp_file(&self, prefix: &str, ext: &str) -> SnapResult<PathBuf> {
        let dir = self.ensure_dir()?;

        let timestamp = Utc::now();
        let stamp = timestamp.format("%Y%m%dT%H%M%S").to_string();
        let suffix = format!(".{}", ext.trim_start_matches('.'));

        let file = tempfile::Builder::new()
            .prefix(&format!("{}-{}-", prefix, stamp))
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(SnapError::IoError)?;
        let (_, path) = file.keep().map_err(|e| SnapError::IoError(e.error))?;

        if let Ok(mut files) = self.files.lock() {
            files.push(TempFile::new(path.clone(), timestamp));
        }
        tracing::debug!("Allocated temp file {:?}", path);

        Ok(path)
    }

    /// Returns the number of tracked temporary files
    pub fn count(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    /// Returns a list of all tracked file paths in creation order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .map(|files| files.iter().map(|f| f.path.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for TempFileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_manager() {
        let manager = TempFileManager::new();
        assert_eq!(manager.count(), 0);
        assert!(manager.dir().ends_with("snapup"));
    }

    #[test]
    fn test_create_temp_file() {
        let scratch = tempfile::tempdir().unwrap();
        let manager = TempFileManager::with_dir(scratch.path().join("snapup"));
        let path = manager.create_temp_file("capture", "png").unwrap();

        assert!(path.exists());
        assert!(path.starts_with(scratch.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("capture-"));
        assert!(name.ends_with(".png"));
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_extension_leading_dot_tolerated() {
        let scratch = tempfile::tempdir().unwrap();
        let manager = TempFileManager::with_dir(scratch.path());
        let path = manager.create_temp_file("fetch", ".jpg").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with(".jpg"));
        assert!(!name.ends_with("..jpg"));
    }

    #[test]
    fn test_unique_filenames_three_files() {
        let scratch = tempfile::tempdir().unwrap();
        let manager = TempFileManager::with_dir(scratch.path());

        let path1 = manager.create_temp_file("capture", "png").unwrap();
        let path2 = manager.create_temp_file("capture", "png").unwrap();
        let path3 = manager.create_temp_file("capture", "png").unwrap();

        assert_ne!(path1, path2);
        assert_ne!(path2, path3);
        assert_ne!(path1, path3);
        assert_eq!(manager.list_files(), vec![path1, path2, path3]);
    }

    #[test]
    fn test_files_survive_drop() {
        let scratch = tempfile::tempdir().unwrap();
        let path = {
            let manager = TempFileManager::with_dir(scratch.path());
            manager.create_temp_file("keep", "png").unwrap()
        };

        assert!(path.exists());
    }

    #[test]
    fn test_clone_shares_state() {
        let scratch = tempfile::tempdir().unwrap();
        let manager1 = TempFileManager::with_dir(scratch.path());
        let manager2 = manager1.clone();

        manager1.create_temp_file("a", "png").unwrap();
        manager2.create_temp_file("b", "png").unwrap();

        assert_eq!(manager1.count(), 2);
        assert_eq!(manager2.count(), 2);
    }

    #[test]
    fn test_thread_safety_with_arc_clone() {
        use std::thread;

        let scratch = tempfile::tempdir().unwrap();
        let manager = TempFileManager::with_dir(scratch.path());
        let manager_clone = manager.clone();

        let handle = thread::spawn(move || manager_clone.create_temp_file("thread", "png").unwrap());

        let path1 = manager.create_temp_file("main", "png").unwrap();
        let path2 = handle.join().unwrap();

        assert_ne!(path1, path2);
        assert_eq!(manager.count(), 2);
    }
}
