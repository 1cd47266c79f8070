//! Run orchestration
//!
//! [`App`] wires a capture backend, an uploader and a result sink together
//! and executes one [`RunConfig`]:
//!
//! - **Inputs:** every local path is checked up front, then all inputs are
//!   fetched (if remote) and uploaded concurrently. URLs come back in input
//!   order.
//! - **Repeat:** N captures one after another, then resize and upload all N
//!   concurrently.
//! - **Single:** one capture (optionally into `--output`), resize, upload.
//!
//! The first failure anywhere aborts the run; remaining in-flight work is
//! dropped.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::try_join_all;
use reqwest::Client;
use tracing::{info, warn};

use crate::{
    capture::{CaptureFacade, capture_once, capture_series},
    config::Settings,
    error::{SnapError, SnapResult},
    model::{InputItem, RunConfig, RunMode, UploadedImage},
    sink::{ResultSink, deliver},
    upload::Uploader,
    util::{fetch::fetch_to_temp, resize::resize_if_retina, temp_files::TempFileManager},
};

/// Everything a run needs, assembled once at startup
#[derive(Clone)]
pub struct App {
    settings:   Settings,
    http:       Client,
    capture:    Arc<dyn CaptureFacade>,
    uploader:   Arc<dyn Uploader>,
    sink:       Arc<dyn ResultSink>,
    temp_files: TempFileManager,
    cwd:        PathBuf,
}

impl App {
    /// Creates an app from its collaborators
    pub fn new(
        settings: Settings,
        http: Client,
        capture: Arc<dyn CaptureFacade>,
        uploader: Arc<dyn Uploader>,
        sink: Arc<dyn ResultSink>,
    ) -> SnapResult<Self> {
        Ok(Self {
            settings,
            http,
            capture,
            uploader,
            sink,
            temp_files: TempFileManager::new(),
            cwd: std::env::current_dir()?,
        })
    }

    /// Uses a custom temp file manager
    pub fn with_temp_files(mut self, temp_files: TempFileManager) -> Self {
        self.temp_files = temp_files;
        self
    }

    /// Resolves relative inputs and `--output` against `cwd`
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Temp file manager used for captures and downloads
    pub fn temp_files(&self) -> &TempFileManager {
        &self.temp_files
    }

    /// Executes the run and delivers the URLs
    ///
    /// Returns the URLs in input (or capture) order.
    pub async fn run(&self, config: &RunConfig) -> SnapResult<Vec<String>> {
        let uploaded = match config.mode() {
            RunMode::Inputs(inputs) => self.upload_inputs(&inputs).await?,
            RunMode::Repeat(times) => {
                if config.output.is_some() {
                    warn!("--output is ignored together with --times");
                }
                self.capture_repeated(times).await?
            }
            RunMode::Single { output } => vec![self.capture_single(output.as_deref()).await?],
        };

        let urls: Vec<String> = uploaded.into_iter().map(|u| u.url).collect();
        deliver(self.sink.as_ref(), &urls, config.quiet).await?;
        Ok(urls)
    }

    /// Classifies inputs and fails on the first local path that is missing
    pub fn resolve_inputs(&self, inputs: &[String]) -> SnapResult<Vec<InputItem>> {
        inputs
            .iter()
            .map(|raw| {
                let item = InputItem::parse(raw, &self.cwd);
                if let InputItem::Local(path) = &item {
                    if !path.exists() {
                        return Err(SnapError::InputNotFound { path: path.clone() });
                    }
                }
                Ok(item)
            })
            .collect()
    }

    /// Uploads supplied inputs concurrently, preserving input order
    pub async fn upload_inputs(&self, inputs: &[String]) -> SnapResult<Vec<UploadedImage>> {
        let items = self.resolve_inputs(inputs)?;
        info!("Uploading {} input(s)", items.len());

        try_join_all(items.into_iter().map(|item| self.upload_input(item))).await
    }

    async fn upload_input(&self, item: InputItem) -> SnapResult<UploadedImage> {
        let path = match item {
            InputItem::Local(path) => path,
            InputItem::Remote(url) => fetch_to_temp(&self.http, &url, &self.temp_files).await?,
        };
        self.upload(path).await
    }

    /// Captures `times` screenshots in sequence, then uploads them concurrently
    pub async fn capture_repeated(&self, times: u32) -> SnapResult<Vec<UploadedImage>> {
        let paths = capture_series(self.capture.as_ref(), &self.temp_files, times).await?;
        info!("Captured {} screenshot(s), uploading", paths.len());

        try_join_all(paths.into_iter().map(|path| self.resize_and_upload(path))).await
    }

    /// Captures once into `output` (or a temp file), resizes and uploads
    pub async fn capture_single(&self, output: Option<&Path>) -> SnapResult<UploadedImage> {
        let dest = match output {
            Some(output) => self.cwd.join(output),
            None => self.temp_files.create_temp_file("capture", "png")?,
        };
        capture_once(self.capture.as_ref(), &dest).await?;
        self.resize_and_upload(dest).await
    }

    async fn resize_and_upload(&self, path: PathBuf) -> SnapResult<UploadedImage> {
        resize_if_retina(&path, self.settings.retina_dpi).await?;
        self.upload(path).await
    }

    async fn upload(&self, path: PathBuf) -> SnapResult<UploadedImage> {
        let url = self.uploader.upload(&path).await?;
        Ok(UploadedImage::new(path, url))
    }
}
