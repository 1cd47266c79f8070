//! Gyazo-compatible anonymous uploader
//!
//! The `upload.cgi` protocol is a multipart POST with the image in the
//! `imagedata` field and an optional device `id`. The response body is the
//! plain-text URL of the uploaded image.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, multipart};
use tracing::{debug, info};

use super::{Uploader, file_part};
use crate::{
    config::Settings,
    error::{SnapError, SnapResult},
};

/// Longest slice of an error body quoted in `UploadFailed`
const MAX_DETAIL: usize = 200;

/// Uploader for Gyazo `upload.cgi` endpoints
#[derive(Debug, Clone)]
pub struct GyazoUploader {
    client:    Client,
    endpoint:  String,
    device_id: Option<String>,
}

impl GyazoUploader {
    /// Creates an anonymous uploader for `endpoint`
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            device_id: None,
        }
    }

    /// Sends `id` with every upload so images land in that device's history
    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    /// Builds an uploader from the endpoint and device id in `settings`
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        let uploader = Self::new(client, settings.endpoint());
        match settings.gyazo_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => uploader.with_device_id(id),
            _ => uploader,
        }
    }

    /// Endpoint uploads are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Extracts the image URL from a plain-text `upload.cgi` response
fn parse_response(path: &Path, status: StatusCode, body: &str) -> SnapResult<String> {
    let fail = |reason: String| SnapError::UploadFailed {
        path: path.to_path_buf(),
        reason,
    };

    let body = body.trim();
    if !status.is_success() {
        let detail: String = body.chars().take(MAX_DETAIL).collect();
        if detail.is_empty() {
            return Err(fail(format!("HTTP {}", status)));
        }
        return Err(fail(format!("HTTP {}: {}", status, detail)));
    }

    match Url::parse(body) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(body.to_string()),
        _ => Err(fail(format!(
            "response is not a URL: {:?}",
            body.chars().take(MAX_DETAIL).collect::<String>()
        ))),
    }
}

#[async_trait]
impl Uploader for GyazoUploader {
    async fn upload(&self, path: &Path) -> SnapResult<String> {
        let (part, len) = file_part(path).await?;
        debug!("Uploading {:?} ({} bytes) to {}", path, len, self.endpoint);

        let mut form = multipart::Form::new().part("imagedata", part);
        if let Some(id) = &self.device_id {
            form = form.text("id", id.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let link = parse_response(path, status, &body)?;

        info!("Uploaded {:?} -> {}", path, link);
        Ok(link)
    }
}
