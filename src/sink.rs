//! Result delivery: clipboard and browser
//!
//! [`SystemSink`] shells out to a clipboard utility (fed through stdin) and a
//! URL opener. [`RecordingSink`] captures calls for tests.

use std::{process::Stdio, sync::Mutex};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use crate::{
    config::Settings,
    error::{SnapError, SnapResult},
};

/// Destination for uploaded URLs
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Replaces the clipboard contents with `text`
    async fn copy_to_clipboard(&self, text: &str) -> SnapResult<()>;

    /// Opens every URL in the default browser
    async fn open_urls(&self, urls: &[String]) -> SnapResult<()>;
}

/// Copies the URLs joined by newlines and opens them unless `quiet`
///
/// The clipboard is always written, whatever `quiet` says.
pub async fn deliver(sink: &dyn ResultSink, urls: &[String], quiet: bool) -> SnapResult<()> {
    let text = urls.join("\n");
    sink.copy_to_clipboard(&text).await?;
    info!("Copied {} URL(s) to clipboard", urls.len());

    if quiet {
        debug!("Quiet mode, not opening browser");
        return Ok(());
    }
    sink.open_urls(urls).await
}

/// Sink backed by external commands (`pbcopy` and `open` by default)
#[derive(Debug, Clone)]
pub struct SystemSink {
    clipboard_command: String,
    open_command:      String,
}

impl SystemSink {
    /// Creates a sink using the given commands
    pub fn new(clipboard_command: impl Into<String>, open_command: impl Into<String>) -> Self {
        Self {
            clipboard_command: clipboard_command.into(),
            open_command:      open_command.into(),
        }
    }

    /// Creates a sink from the configured commands
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.clipboard_command, &settings.open_command)
    }
}

#[async_trait]
impl ResultSink for SystemSink {
    async fn copy_to_clipboard(&self, text: &str) -> SnapResult<()> {
        let fail = |reason: String| SnapError::ClipboardFailed {
            command: self.clipboard_command.clone(),
            reason,
        };

        let mut child = Command::new(&self.clipboard_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| fail(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| fail(e.to_string()))?;
            // closing stdin lets the utility see EOF
            drop(stdin);
        }

        let status = child.wait().await.map_err(|e| fail(e.to_string()))?;
        if !status.success() {
            return Err(fail(format!("exited with {}", status)));
        }
        Ok(())
    }

    async fn open_urls(&self, urls: &[String]) -> SnapResult<()> {
        if urls.is_empty() {
            return Ok(());
        }
        let fail = |reason: String| SnapError::OpenFailed {
            command: self.open_command.clone(),
            reason,
        };

        let status = Command::new(&self.open_command)
            .args(urls)
            .status()
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !status.success() {
            return Err(fail(format!("exited with {}", status)));
        }
        Ok(())
    }
}

/// Sink that records calls instead of touching the desktop
#[derive(Debug, Default)]
pub struct RecordingSink {
    clipboard: Mutex<Vec<String>>,
    opened:    Mutex<Vec<Vec<String>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text copied to the clipboard, in order
    pub fn clipboard(&self) -> Vec<String> {
        self.clipboard.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every batch of URLs opened, in order
    pub fn opened(&self) -> Vec<Vec<String>> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn copy_to_clipboard(&self, text: &str) -> SnapResult<()> {
        if let Ok(mut clipboard) = self.clipboard.lock() {
            clipboard.push(text.to_string());
        }
        Ok(())
    }

    async fn open_urls(&self, urls: &[String]) -> SnapResult<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(urls.to_vec());
        }
        Ok(())
    }
}
