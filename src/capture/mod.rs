//! Capture backend traits and implementations
//!
//! This module provides the abstractions for interactive screen-region
//! capture:
//!
//! - `CaptureFacade`: trait for anything that can write a screenshot to a path
//! - `ScreencaptureBackend`: shells out to the OS capture utility
//! - `MockBackend`: synthetic captures for tests
//! - `capture_series`: sequential multi-capture driver
//! - `ImageBuffer`: decoded image wrapper used by the resize step

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    error::{SnapError, SnapResult},
    util::temp_files::TempFileManager,
};

pub mod image_buffer;
pub mod mock;

pub use image_buffer::ImageBuffer;
pub use mock::MockBackend;

/// Core trait for screenshot capture backends
///
/// Implementations block (asynchronously) until the user has finished the
/// interactive selection. Only one capture may be in progress at a time;
/// callers are responsible for sequencing.
#[async_trait]
pub trait CaptureFacade: Send + Sync {
    /// Captures a user-selected region into `dest`
    ///
    /// A cancelled selection is not an error here. It typically leaves `dest`
    /// missing or empty, which [`verify_capture`] detects.
    async fn capture_region(&self, dest: &Path) -> SnapResult<()>;

    /// Human-readable backend name for logging
    fn name(&self) -> &str;
}

/// Backend that invokes `<command> -i <path>`
///
/// With the default `screencapture` this is the macOS interactive region
/// capture.
#[derive(Debug, Clone)]
pub struct ScreencaptureBackend {
    command: String,
}

impl ScreencaptureBackend {
    /// Creates a backend running the given capture command
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for ScreencaptureBackend {
    fn default() -> Self {
        Self::new("screencapture")
    }
}

#[async_trait]
impl CaptureFacade for ScreencaptureBackend {
    async fn capture_region(&self, dest: &Path) -> SnapResult<()> {
        debug!("Running {} -i {:?}", self.command, dest);

        let status = Command::new(&self.command)
            .arg("-i")
            .arg(dest)
            .status()
            .await
            .map_err(|e| SnapError::CaptureFailed {
                command: self.command.clone(),
                reason:  e.to_string(),
            })?;

        if !status.success() {
            return Err(SnapError::CaptureFailed {
                command: self.command.clone(),
                reason:  format!("exited with {}", status),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Fails with `CaptureCancelled` if `path` is missing or empty
pub async fn verify_capture(path: &Path) -> SnapResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(SnapError::CaptureCancelled {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SnapError::CaptureCancelled {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SnapError::IoError(e)),
    }
}

/// Captures once into `dest` and verifies the result
pub async fn capture_once(backend: &dyn CaptureFacade, dest: &Path) -> SnapResult<()> {
    backend.capture_region(dest).await?;
    verify_capture(dest).await?;
    info!("Captured {:?} with {}", dest, backend.name());
    Ok(())
}

/// Captures `times` screenshots strictly one after another
///
/// Each capture goes into its own temp file. The returned paths are in
/// capture order. The first failure stops the series.
pub async fn capture_series(
    backend: &dyn CaptureFacade,
    temp_files: &TempFileManager,
    times: u32,
) -> SnapResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(times as usize);
    for index in 0..times {
        let dest = temp_files.create_temp_file("capture", "png")?;
        debug!("Capture {}/{}", index + 1, times);
        capture_once(backend, &dest).await?;
        paths.push(dest);
    }
    Ok(paths)
}
