//! Data models and type definitions for snapup
//!
//! This module defines the transient values a run works with:
//! - The immutable run configuration built from command-line arguments
//! - The run mode derived from it
//! - Input items (local paths or remote URLs)
//! - Uploaded results

use std::path::{Path, PathBuf};

use reqwest::Url;

/// Immutable configuration for a single run
///
/// Built once at startup from the command line and passed by reference to
/// everything that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of sequential captures (`0` means a single capture)
    pub times:  u32,
    /// Skip opening URLs in the browser
    pub quiet:  bool,
    /// Write the single capture to this path instead of a temp file
    pub output: Option<PathBuf>,
    /// Positional inputs (local paths or URLs)
    pub inputs: Vec<String>,
}

impl RunConfig {
    /// Determines what this run should do
    ///
    /// Positional inputs take precedence over `times`, which takes
    /// precedence over a single capture.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapup::model::{RunConfig, RunMode};
    ///
    /// let config = RunConfig {
    ///     times: 3,
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.mode(), RunMode::Repeat(3));
    ///
    /// let config = RunConfig::default();
    /// assert_eq!(config.mode(), RunMode::Single { output: None });
    /// ```
    pub fn mode(&self) -> RunMode {
        if !self.inputs.is_empty() {
            RunMode::Inputs(self.inputs.clone())
        } else if self.times > 0 {
            RunMode::Repeat(self.times)
        } else {
            RunMode::Single {
                output: self.output.clone(),
            }
        }
    }
}

/// What a run does, derived from [`RunConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Upload each supplied input
    Inputs(Vec<String>),
    /// Capture N times in sequence, then upload all
    Repeat(u32),
    /// Capture once, optionally into a chosen file
    Single {
        /// Destination for the capture
        output: Option<PathBuf>,
    },
}

/// Returns true if the string is a URL with a host component
///
/// # Examples
///
/// ```
/// use snapup::model::is_url;
///
/// assert!(is_url("https://example.com/x.png"));
/// assert!(!is_url("./photo.png"));
/// assert!(!is_url(""));
/// ```
pub fn is_url(s: &str) -> bool {
    Url::parse(s)
        .map(|url| url.host_str().is_some_and(|host| !host.is_empty()))
        .unwrap_or(false)
}

/// A single positional input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    /// A filesystem path, already resolved against the working directory
    Local(PathBuf),
    /// A remote image to download before upload
    Remote(Url),
}

impl InputItem {
    /// Classifies a raw argument, resolving relative paths against `cwd`
    pub fn parse(raw: &str, cwd: &Path) -> Self {
        if is_url(raw) {
            if let Ok(url) = Url::parse(raw) {
                return InputItem::Remote(url);
            }
        }
        InputItem::Local(cwd.join(raw))
    }
}

/// A file that was uploaded and the URL the host returned for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Local file that was sent
    pub source: PathBuf,
    /// Public URL returned by the host
    pub url:    String,
}

impl UploadedImage {
    /// Creates a new UploadedImage record
    pub fn new(source: PathBuf, url: String) -> Self {
        Self { source, url }
    }
}
