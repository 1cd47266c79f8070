//! Image host uploaders
//!
//! The pipeline only depends on the [`Uploader`] trait: hand it a file, get a
//! public URL back. [`GyazoUploader`] posts anonymously to a Gyazo
//! `upload.cgi` endpoint (the default), [`ImgurUploader`] talks to the Imgur
//! v3 API, and [`MockUploader`] is the test double.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use reqwest::{Client, multipart};

use crate::{
    config::{Settings, UploadHost},
    error::SnapResult,
};

pub mod gyazo;
pub mod imgur;
pub mod mock;

pub use gyazo::GyazoUploader;
pub use imgur::ImgurUploader;
pub use mock::MockUploader;

/// Something that can publish an image file and return its URL
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Uploads the file at `path` and returns its public URL
    async fn upload(&self, path: &Path) -> SnapResult<String>;
}

/// Builds the uploader selected by `settings.host`
///
/// Never fails: host credentials are checked when the first upload is made,
/// so input validation always runs first.
pub fn from_settings(client: Client, settings: &Settings) -> Arc<dyn Uploader> {
    match settings.host {
        UploadHost::Gyazo => Arc::new(GyazoUploader::from_settings(client, settings)),
        UploadHost::Imgur => Arc::new(ImgurUploader::from_settings(client, settings)),
    }
}

/// Guesses the MIME type of an image from its extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Reads `path` into a multipart file part named after the file
pub(crate) async fn file_part(path: &Path) -> SnapResult<(multipart::Part, usize)> {
    let bytes = tokio::fs::read(path).await?;
    let len = bytes.len();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.png")
        .to_string();
    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_for(path))?;
    Ok((part, len))
}
