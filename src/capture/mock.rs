//! Mock capture backend for testing
//!
//! `MockBackend` implements [`CaptureFacade`] without a display. Each capture
//! writes a synthetic PNG test pattern to the destination and records the
//! call, so tests can assert how many captures happened and whether any of
//! them overlapped.
//!
//! # Features
//!
//! - **Synthetic images:** configurable size and `pHYs` density (retina)
//! - **Configurable delay:** simulate a user taking time over a selection
//! - **Cancellation:** leave the destination empty after N captures
//! - **Overlap tracking:** maximum number of captures in progress at once
//!
//! # Examples
//!
//! ```
//! use snapup::capture::{CaptureFacade, MockBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let backend = MockBackend::new().with_size(200, 100).with_density(144.0);
//!
//!     let dest = dir.path().join("shot.png");
//!     backend.capture_region(&dest).await.unwrap();
//!     assert!(dest.exists());
//!     assert_eq!(backend.capture_count(), 1);
//! }
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{CaptureFacade, ImageBuffer};
use crate::error::{SnapError, SnapResult};

/// Mock capture backend for testing and development
#[derive(Debug)]
pub struct MockBackend {
    delay:        Option<Duration>,
    size:         (u32, u32),
    density:      Option<f64>,
    cancel_after: Option<usize>,
    fail:         bool,
    calls:        AtomicUsize,
    active:       AtomicUsize,
    max_active:   AtomicUsize,
    paths:        Mutex<Vec<PathBuf>>,
}

impl MockBackend {
    /// Creates a backend producing 320x200 PNGs without density information
    pub fn new() -> Self {
        Self {
            delay:        None,
            size:         (320, 200),
            density:      None,
            cancel_after: None,
            fail:         false,
            calls:        AtomicUsize::new(0),
            active:       AtomicUsize::new(0),
            max_active:   AtomicUsize::new(0),
            paths:        Mutex::new(Vec::new()),
        }
    }

    /// Sleeps for `delay` during every capture
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the pixel size of generated captures
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Stamps generated captures with the given dpi
    pub fn with_density(mut self, dpi: f64) -> Self {
        self.density = Some(dpi);
        self
    }

    /// After `n` successful captures, every further capture writes nothing
    pub fn cancel_after(mut self, n: usize) -> Self {
        self.cancel_after = Some(n);
        self
    }

    /// Makes every capture fail as if the utility exited unsuccessfully
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of capture calls made so far
    pub fn capture_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of captures that were in progress simultaneously
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Destinations of successful captures, in order
    pub fn captured_paths(&self) -> Vec<PathBuf> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn render(&self, dest: &Path) -> SnapResult<Vec<u8>> {
        let (width, height) = self.size;
        ImageBuffer::from_test_pattern(width, height)
            .encode_png(self.density)
            .map_err(|e| SnapError::ImageError {
                path:   dest.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureFacade for MockBackend {
    async fn capture_region(&self, dest: &Path) -> SnapResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        if self.fail {
            return Err(SnapError::CaptureFailed {
                command: "mock".to_string(),
                reason:  "injected failure".to_string(),
            });
        }

        if self.cancel_after.is_some_and(|n| call >= n) {
            tokio::fs::write(dest, b"").await?;
            return Ok(());
        }

        tokio::fs::write(dest, self.render(dest)?).await?;
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(dest.to_path_buf());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
