//! Imgur API v3 uploader

use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{AUTHORIZATION, HeaderValue},
    multipart,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{Uploader, file_part};
use crate::{
    config::Settings,
    error::{SnapError, SnapResult},
};

/// Anonymous uploader for the Imgur v3 image endpoint
///
/// The client id is only required once an upload is attempted.
#[derive(Debug, Clone)]
pub struct ImgurUploader {
    client:    Client,
    endpoint:  String,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgurResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data:    ImgurData,
}

#[derive(Debug, Default, Deserialize)]
struct ImgurData {
    link:  Option<String>,
    error: Option<serde_json::Value>,
}

impl ImgurUploader {
    /// Creates an uploader for `endpoint` with no client id yet
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            client_id: None,
        }
    }

    /// Authenticates uploads with `client_id`; blank ids are ignored
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        let trimmed = client_id.trim();
        self.client_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Builds an uploader from the endpoint and client id in `settings`
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        let uploader = Self::new(client, settings.endpoint());
        match settings.imgur_client_id.as_deref() {
            Some(id) => uploader.with_client_id(id),
            None => uploader,
        }
    }

    /// Endpoint uploads are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_header(&self) -> SnapResult<HeaderValue> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| SnapError::UploaderNotConfigured {
                reason: "no Imgur client id".to_string(),
            })?;
        HeaderValue::from_str(&format!("Client-ID {}", client_id)).map_err(|e| {
            SnapError::UploaderNotConfigured {
                reason: format!("client id is not a valid header value: {}", e),
            }
        })
    }
}

/// Extracts the image link from an Imgur API response
fn parse_response(path: &Path, status: StatusCode, body: &str) -> SnapResult<String> {
    let parsed: Result<ImgurResponse, _> = serde_json::from_str(body);

    let fail = |reason: String| SnapError::UploadFailed {
        path: path.to_path_buf(),
        reason,
    };

    let response = match parsed {
        Ok(response) => response,
        Err(_) if !status.is_success() => return Err(fail(format!("HTTP {}", status))),
        Err(e) => return Err(fail(format!("unexpected response: {}", e))),
    };

    if !status.is_success() || !response.success {
        let detail = response
            .data
            .error
            .map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| "no error detail".to_string());
        return Err(fail(format!("HTTP {}: {}", status, detail)));
    }

    response
        .data
        .link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| fail("response has no link".to_string()))
}

#[async_trait]
impl Uploader for ImgurUploader {
    async fn upload(&self, path: &Path) -> SnapResult<String> {
        let auth = self.auth_header()?;
        let (part, len) = file_part(path).await?;
        debug!("Uploading {:?} ({} bytes) to {}", path, len, self.endpoint);

        let form = multipart::Form::new()
            .text("type", "file")
            .part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
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
