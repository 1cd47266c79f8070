//! Shared test harness for snapup integration tests
//!
//! Provides an `App` wired to the public mocks inside a scratch directory,
//! helpers for writing PNG fixtures, and a tiny HTTP server for remote
//! inputs and upload endpoints.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use reqwest::Client;
use snapup::{
    capture::{ImageBuffer, MockBackend},
    config::Settings,
    pipeline::App,
    sink::RecordingSink,
    upload::MockUploader,
    util::temp_files::TempFileManager,
};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// An `App` plus handles on its mocks and scratch directory
pub struct Harness {
    pub dir:      TempDir,
    pub app:      App,
    pub backend:  Arc<MockBackend>,
    pub uploader: Arc<MockUploader>,
    pub sink:     Arc<RecordingSink>,
}

impl Harness {
    /// Harness with default mocks
    pub fn new() -> Self {
        Self::with(MockBackend::new(), MockUploader::new())
    }

    /// Harness with the given capture backend and uploader
    pub fn with(backend: MockBackend, uploader: MockUploader) -> Self {
        let dir = tempfile::tempdir().expect("create scratch dir");
        let backend = Arc::new(backend);
        let uploader = Arc::new(uploader);
        let sink = Arc::new(RecordingSink::new());

        let app = App::new(
            Settings::default(),
            Client::builder().no_proxy().build().expect("http client"),
            backend.clone(),
            uploader.clone(),
            sink.clone(),
        )
        .expect("build app")
        .with_temp_files(TempFileManager::with_dir(dir.path().join("tmp")))
        .with_cwd(dir.path());

        Self {
            dir,
            app,
            backend,
            uploader,
            sink,
        }
    }

    /// Writes a PNG fixture into the scratch directory and returns its path
    pub fn png(&self, name: &str, width: u32, height: u32, dpi: Option<f64>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, png_bytes(width, height, dpi)).expect("write fixture");
        path
    }
}

/// Encoded PNG test pattern, optionally declaring a density
pub fn png_bytes(width: u32, height: u32, dpi: Option<f64>) -> Vec<u8> {
    ImageBuffer::from_test_pattern(width, height)
        .encode_png(dpi)
        .expect("encode fixture")
}

/// A canned HTTP response
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body:   Vec<u8>,
    pub delay:  Duration,
}

impl Route {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request received by [`serve`]
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path:   String,
    pub head:   String,
    pub body:   Vec<u8>,
}

impl Request {
    /// Value of the first header called `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    /// Body decoded lossily as text
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Route server handle: base URL plus every request seen so far
pub struct TestServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("request log").clone()
    }
}

/// Serves a fixed route table on an ephemeral port
///
/// Any method is accepted; request bodies (`Content-Length` or chunked) are
/// read in full and recorded. Unknown paths get 404.
pub async fn serve(routes: HashMap<&'static str, Route>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let log = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut stream).await else {
                    return;
                };
                let route = routes
                    .get(request.path.as_str())
                    .cloned()
                    .unwrap_or(Route::status(404));
                log.lock().expect("request log").push(request);

                tokio::time::sleep(route.delay).await;
                let header = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nContent-Type: \
                     application/octet-stream\r\nConnection: close\r\n\r\n",
                    route.status,
                    route.body.len()
                );
                let _ = stream.write_all(header.as_bytes()).await;
                let _ = stream.write_all(&route.body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    TestServer {
        base: format!("http://{}", addr),
        requests,
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    };

    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let mut request_line = head.split_whitespace();
    let method = request_line.next().unwrap_or("GET").to_string();
    let path = request_line.next().unwrap_or("/").to_string();
    let mut request = Request {
        method,
        path,
        head,
        body: raw[head_end..].to_vec(),
    };

    let chunked = request
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));
    if chunked {
        while !request.body.ends_with(b"0\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return None,
                Ok(n) => request.body.extend_from_slice(&buf[..n]),
            }
        }
        request.body = dechunk(&request.body);
    } else {
        let len: usize = request
            .header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while request.body.len() < len {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return None,
                Ok(n) => request.body.extend_from_slice(&buf[..n]),
            }
        }
    }
    Some(request)
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    while let Some(pos) = raw.windows(2).position(|w| w == b"\r\n") {
        let size_line = String::from_utf8_lossy(&raw[..pos]);
        let size_hex = size_line.split(';').next().unwrap_or("0").trim();
        let Ok(size) = usize::from_str_radix(size_hex, 16) else {
            break;
        };
        let start = pos + 2;
        if size == 0 || start + size > raw.len() {
            break;
        }
        body.extend_from_slice(&raw[start..start + size]);
        raw = &raw[(start + size + 2).min(raw.len())..];
    }
    body
}
