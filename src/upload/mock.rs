//! Mock uploader for testing
//!
//! Returns `https://mock.host/<n>/<file name>` for each upload, where `n` is
//! the order in which uploads *finished*. Per-file delays make it easy to
//! force completion order to differ from submission order.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::Uploader;
use crate::error::{SnapError, SnapResult};

/// Mock uploader that never touches the network
#[derive(Debug, Default)]
pub struct MockUploader {
    delay:      Option<Duration>,
    delays:     HashMap<String, Duration>,
    failures:   HashSet<String>,
    calls:      AtomicUsize,
    in_flight:  AtomicUsize,
    max_flight: AtomicUsize,
    completed:  Mutex<Vec<PathBuf>>,
}

impl MockUploader {
    /// Creates an uploader that answers immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` during every upload without a specific delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleeps for `delay` when uploading a file with this name
    pub fn with_delay_for(mut self, file_name: &str, delay: Duration) -> Self {
        self.delays.insert(file_name.to_string(), delay);
        self
    }

    /// Fails uploads of a file with this name
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failures.insert(file_name.to_string());
        self
    }

    /// Number of upload calls made so far
    pub fn upload_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of uploads in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_flight.load(Ordering::SeqCst)
    }

    /// Files whose upload finished successfully, in completion order
    pub fn completed(&self) -> Vec<PathBuf> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(&self, path: &Path) -> SnapResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_flight.fetch_max(now, Ordering::SeqCst);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if let Some(delay) = self.delays.get(&name).copied().or(self.delay) {
            sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !path.exists() {
            return Err(SnapError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        if self.failures.contains(&name) {
            return Err(SnapError::UploadFailed {
                path:   path.to_path_buf(),
                reason: "injected failure".to_string(),
            });
        }

        let mut completed = self
            .completed
            .lock()
            .map_err(|_| SnapError::UploadFailed {
                path:   path.to_path_buf(),
                reason: "mock state poisoned".to_string(),
            })?;
        completed.push(path.to_path_buf());
        Ok(format!("https://mock.host/{}/{}", completed.len(), name))
    }
}
