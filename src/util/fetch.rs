//! Downloading remote inputs into temporary files

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Client, Url};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::{
    error::{SnapError, SnapResult},
    util::temp_files::TempFileManager,
};

/// Extension used when the URL path does not name one
pub const DEFAULT_EXTENSION: &str = "png";

/// Picks a file extension from the last path segment of `url`
///
/// # Examples
///
/// ```
/// use reqwest::Url;
/// use snapup::util::fetch::extension_for;
///
/// let url = Url::parse("https://example.com/cats/tabby.JPG?size=large").unwrap();
/// assert_eq!(extension_for(&url), "jpg");
///
/// let url = Url::parse("https://example.com/render").unwrap();
/// assert_eq!(extension_for(&url), "png");
/// ```
pub fn extension_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .map(Path::new)
        .and_then(|name| name.extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Streams the body of `url` into a new temporary file and returns its path
pub async fn fetch_to_temp(
    client: &Client,
    url: &Url,
    temp_files: &TempFileManager,
) -> SnapResult<PathBuf> {
    let fail = |reason: String| SnapError::FetchFailed {
        url: url.to_string(),
        reason,
    };

    debug!("Fetching {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(format!("HTTP {}", status)));
    }

    let path = temp_files.create_temp_file("fetch", &extension_for(url))?;
    let mut file = tokio::fs::File::create(&path).await?;
    let mut written = 0u64;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| fail(e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!("Fetched {} ({} bytes) into {:?}", url, written, path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(s: &str) -> String {
        extension_for(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_extension_from_path() {
        assert_eq!(ext("https://example.com/x.png"), "png");
        assert_eq!(ext("https://example.com/a/b/photo.jpeg"), "jpeg");
        assert_eq!(ext("https://example.com/anim.GIF"), "gif");
    }

    #[test]
    fn test_extension_default() {
        assert_eq!(ext("https://example.com/"), "png");
        assert_eq!(ext("https://example.com"), "png");
        assert_eq!(ext("https://example.com/image"), "png");
        assert_eq!(ext("https://example.com/archive.verylongext"), "png");
    }

    #[test]
    fn test_extension_ignores_query() {
        assert_eq!(ext("https://example.com/x.webp?w=100&fmt=.png"), "webp");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let dir = tempfile::tempdir().unwrap();
        let temp_files = TempFileManager::with_dir(dir.path());
        // port 9 (discard) on localhost is closed in test environments
        let url = Url::parse("http://127.0.0.1:9/x.png").unwrap();

        let client = Client::builder().no_proxy().build().unwrap();
        let result = fetch_to_temp(&client, &url, &temp_files).await;
        assert!(matches!(result, Err(SnapError::FetchFailed { .. })));
        assert_eq!(temp_files.count(), 0);
    }
}
