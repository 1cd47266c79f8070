//! Error types for snapup operations
//!
//! Every failure that can end a run is a variant of [`SnapError`]. Each
//! variant carries the context needed to explain what went wrong and exposes
//! an actionable hint through [`SnapError::remediation_hint`]. The binary maps
//! errors to a process exit status with [`SnapError::exit_code`].

use std::path::PathBuf;

/// Result type alias for snapup operations
pub type SnapResult<T> = Result<T, SnapError>;

/// Exit status used when a supplied input file is missing
pub const EXIT_INPUT_NOT_FOUND: u8 = 1;

/// Exit status used for every other failure
pub const EXIT_FAILURE: u8 = 2;

/// Error type for capture, resize, upload and delivery operations
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    /// A local input path does not exist
    #[error("File does not exist: {}", path.display())]
    InputNotFound {
        /// Absolute path that was checked
        path: PathBuf,
    },

    /// Downloading a remote input failed
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed {
        /// URL that was requested
        url:    String,
        /// Reason for the failure
        reason: String,
    },

    /// The screenshot utility could not be run or exited unsuccessfully
    #[error("Screen capture with '{command}' failed: {reason}")]
    CaptureFailed {
        /// Capture command that was invoked
        command: String,
        /// Reason for the failure
        reason:  String,
    },

    /// The interactive selection was cancelled, leaving no image behind
    #[error("Screen capture was cancelled, nothing written to {}", path.display())]
    CaptureCancelled {
        /// Path the capture was supposed to write
        path: PathBuf,
    },

    /// Decoding, resizing or re-encoding an image failed
    #[error("Image processing error for {}: {reason}", path.display())]
    ImageError {
        /// Image that was being processed
        path:   PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// The image host rejected the upload or answered unexpectedly
    #[error("Upload of {} failed: {reason}", path.display())]
    UploadFailed {
        /// File that was uploaded
        path:   PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// No credentials are configured for the image host
    #[error("Uploader is not configured: {reason}")]
    UploaderNotConfigured {
        /// What is missing
        reason: String,
    },

    /// Copying to the clipboard failed
    #[error("Clipboard copy with '{command}' failed: {reason}")]
    ClipboardFailed {
        /// Clipboard command that was invoked
        command: String,
        /// Reason for the failure
        reason:  String,
    },

    /// Opening a URL in the browser failed
    #[error("Opening URLs with '{command}' failed: {reason}")]
    OpenFailed {
        /// Open command that was invoked
        command: String,
        /// Reason for the failure
        reason:  String,
    },

    /// The configuration file could not be read or parsed
    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigError {
        /// Config file path
        path:   PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl SnapError {
    /// Returns the process exit status for this error
    ///
    /// A missing input exits with `1`; everything else exits with `2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapup::error::SnapError;
    ///
    /// let error = SnapError::InputNotFound {
    ///     path: "/tmp/missing.png".into(),
    /// };
    /// assert_eq!(error.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> u8 {
        match self {
            SnapError::InputNotFound { .. } => EXIT_INPUT_NOT_FOUND,
            _ => EXIT_FAILURE,
        }
    }

    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> &str {
        match self {
            SnapError::InputNotFound { .. } => {
                "Check the path. Relative paths are resolved against the current directory."
            }
            SnapError::FetchFailed { .. } => {
                "Make sure the URL is reachable and points directly at an image."
            }
            SnapError::CaptureFailed { command, .. } => {
                if command == "screencapture" {
                    "screencapture ships with macOS. Grant screen recording permission to your \
                     terminal in System Settings > Privacy & Security > Screen Recording."
                } else {
                    "Check that the configured capture command is installed and accepts '-i \
                     <path>'."
                }
            }
            SnapError::CaptureCancelled { .. } => {
                "The selection was cancelled. Run again and drag a region, or press space to \
                 pick a window."
            }
            SnapError::ImageError { .. } => {
                "The captured file could not be processed as an image. Try capturing again."
            }
            SnapError::UploadFailed { .. } => {
                "The image host rejected the upload. Check your network connection and client id, \
                 then retry."
            }
            SnapError::UploaderNotConfigured { .. } => {
                "Set SNAPUP_IMGUR_CLIENT_ID or add imgur_client_id to the config file. Register an \
                 application at https://api.imgur.com/oauth2/addclient to get one, or switch to \
                 the anonymous Gyazo host with SNAPUP_HOST=gyazo."
            }
            SnapError::ClipboardFailed { .. } => {
                "Check that the clipboard command is installed (pbcopy on macOS) or set \
                 SNAPUP_CLIPBOARD_CMD."
            }
            SnapError::OpenFailed { .. } => {
                "Check that the open command is installed or set SNAPUP_OPEN_CMD. Use --quiet to \
                 skip opening the browser."
            }
            SnapError::ConfigError { .. } => {
                "Fix the JSON syntax in the config file or remove it to use defaults."
            }
            SnapError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
            SnapError::HttpError(_) => "A network error occurred. Check your connection and retry.",
        }
    }
}
