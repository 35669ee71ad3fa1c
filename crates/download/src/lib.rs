// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Hash-validated download engine.
//!
//! A single [`Asset`] binds a remote URL to a local path with an expected
//! size and digest. [`download_file`] drives one asset through skip checks,
//! retries and validation; [`download_all`] runs a whole set at bounded
//! parallelism while aggregating byte-accurate progress.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::{StreamExt, TryStreamExt};
use log::{debug, warn};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use config::download::DownloadConfig;
use shared::{HTTP_CLIENT, REQUEST_TIMEOUT};

mod error;
mod hash;

pub use error::*;
pub use hash::*;

/// File extensions the launcher must never clobber, these are user-editable
/// configuration files.
const PRESERVED_EXTENSIONS: [&str; 5] = ["txt", "json", "yml", "yaml", "dat"];

#[cfg(not(test))]
const BACKOFF_UNIT: Duration = Duration::from_secs(1);
#[cfg(test)]
const BACKOFF_UNIT: Duration = Duration::from_millis(5);

/// A remote-to-local file binding produced by index validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub url: String,
    /// Declared size in bytes.
    pub size: u64,
    pub checksum: Checksum,
    /// Absolute target path.
    pub path: PathBuf,
}

/// Downloads one asset, retrying transient failures with exponential backoff.
///
/// `on_progress` receives `(transferred, total)` byte counts for the current
/// attempt; a retry emits a single `(0, 0)` reset so aggregating callers can
/// rewind this asset's contribution.
///
/// Returns the number of bytes received over the wire, `0` when the file was
/// already valid on disk and no request was made.
pub async fn download_file<F>(asset: &Asset, config: &DownloadConfig, on_progress: F) -> Result<u64>
where
    F: Fn(u64, u64),
{
    if let Some(extension) = asset.path.extension()
        && PRESERVED_EXTENSIONS
            .iter()
            .any(|preserved| extension.eq_ignore_ascii_case(preserved))
        && asset.path.exists()
    {
        debug!("Skipping preserved file {}", asset.path.display());
        return Ok(0);
    }
    if let Some(parent) = asset.path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    if is_valid_on_disk(&asset.path, &asset.checksum) {
        debug!("Already valid on disk: {}", asset.id);
        return Ok(0);
    }

    let mut retried = 0;
    loop {
        let result = attempt_download(asset, &on_progress).await;
        let error = match result {
            Ok(received) => return Ok(received),
            Err(error) => error,
        };
        if !matches!(error, Error::Validation(_)) {
            remove_partial(asset).await;
        }
        if !error.is_retryable() || retried >= config.max_retries {
            return Err(error);
        }
        retried += 1;
        warn!("Download failed: {}, retried: {retried}", &asset.url);
        on_progress(0, 0);
        async_io::Timer::after(BACKOFF_UNIT * (1u32 << retried)).await;
    }
}

/// One request/validate cycle: buffer the body while hashing it, write the
/// buffer next to the target, rename into place, then compare digests.
async fn attempt_download<F>(asset: &Asset, on_progress: &F) -> Result<u64>
where
    F: Fn(u64, u64),
{
    let mut response = HTTP_CLIENT
        .get(&asset.url)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpResponseNotSuccess(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown").to_string(),
        ));
    }
    let total = response.content_length().unwrap_or(asset.size);
    let mut buffer = Vec::with_capacity(asset.size as usize);
    let mut hasher = Hasher::from(&asset.checksum);
    while let Some(chunk) = response.chunk().await? {
        hasher.update(&chunk);
        buffer.extend_from_slice(&chunk);
        on_progress(buffer.len() as u64, total);
    }
    let part = partial_path(asset);
    async_fs::write(&part, &buffer).await?;
    async_fs::rename(&part, &asset.path).await?;
    if !hasher.verify(&asset.checksum) {
        return Err(Error::Validation(asset.url.clone()));
    }
    Ok(buffer.len() as u64)
}

fn partial_path(asset: &Asset) -> PathBuf {
    let name = asset
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    asset.path.with_file_name(format!("{name}.part"))
}

async fn remove_partial(asset: &Asset) {
    let _ = async_fs::remove_file(partial_path(asset)).await;
}

/// Drives a set of assets at bounded parallelism.
///
/// `on_progress` observes the aggregate received byte count, which is
/// non-decreasing except for per-asset retry rewinds. The first fatal error
/// aborts the run; assets already finished stay on disk.
///
/// Returns the bytes received per asset id.
pub async fn download_all<F>(
    assets: Vec<Asset>,
    config: &DownloadConfig,
    on_progress: F,
) -> Result<HashMap<String, u64>>
where
    F: Fn(u64) + Sync,
{
    let aggregate = Arc::new(AtomicU64::new(0));
    let on_progress = &on_progress;
    futures::stream::iter(assets.into_iter().map(|asset| {
        let aggregate = aggregate.clone();
        async move {
            let previous = AtomicU64::new(0);
            let received = download_file(&asset, config, |transferred, _total| {
                let before = previous.swap(transferred, Ordering::SeqCst);
                if transferred >= before {
                    aggregate.fetch_add(transferred - before, Ordering::SeqCst);
                } else {
                    aggregate.fetch_sub(before - transferred, Ordering::SeqCst);
                }
                on_progress(aggregate.load(Ordering::SeqCst));
            })
            .await?;
            Ok::<(String, u64), Error>((asset.id, received))
        }
    }))
    .buffer_unordered(config.concurrency)
    .try_collect()
    .await
}

/// Keeps only the assets that are missing on disk or fail their hash
/// comparison. Hashing runs on the rayon pool, large sets are IO and CPU
/// heavy.
pub fn filter_invalid_assets(assets: Vec<Asset>) -> Vec<Asset> {
    assets
        .into_par_iter()
        .filter(|asset| !is_valid_on_disk(&asset.path, &asset.checksum))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

    #[derive(Clone)]
    struct MockResponse {
        status_line: &'static str,
        body: &'static str,
    }

    fn spawn_mock_server(
        responses: Vec<MockResponse>,
    ) -> (String, Arc<AtomicUsize>, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let handle = thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = listener.accept().expect("accept failed");
                hits_clone.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0_u8; 2048];
                let _ = stream.read(&mut buf);
                let body = response.body.as_bytes();
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status_line,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        (format!("http://{addr}"), hits, handle)
    }

    fn hello_asset(url: String, path: PathBuf) -> Asset {
        Asset {
            id: "hello".to_string(),
            url,
            size: 5,
            checksum: Checksum::Sha1(HELLO_SHA1.to_string()),
            path,
        }
    }

    #[tokio::test]
    async fn valid_file_on_disk_is_not_requested() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("hello.bin");
        std::fs::write(&path, b"hello").expect("write");
        // port 9 is discard, nothing listens there in tests
        let asset = hello_asset("http://127.0.0.1:9/hello.bin".to_string(), path);
        let received = download_file(&asset, &DownloadConfig::default(), |_, _| {})
            .await
            .expect("skip");
        assert_eq!(received, 0);
    }

    #[tokio::test]
    async fn preserved_extension_is_never_clobbered() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("options.json");
        std::fs::write(&path, b"user edited").expect("write");
        let mut asset = hello_asset("http://127.0.0.1:9/options.json".to_string(), path.clone());
        asset.checksum = Checksum::Sha1("0000000000000000000000000000000000000000".to_string());
        download_file(&asset, &DownloadConfig::default(), |_, _| {})
            .await
            .expect("skip");
        assert_eq!(std::fs::read(&path).expect("read"), b"user edited");
    }

    #[tokio::test]
    async fn server_error_is_retried_then_succeeds() {
        let responses = vec![
            MockResponse {
                status_line: "500 Internal Server Error",
                body: "",
            },
            MockResponse {
                status_line: "200 OK",
                body: "hello",
            },
        ];
        let (base, hits, handle) = spawn_mock_server(responses);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("hello.bin");
        let asset = hello_asset(format!("{base}/hello.bin"), path.clone());

        let resets = Arc::new(AtomicUsize::new(0));
        let resets_clone = resets.clone();
        let received = download_file(&asset, &DownloadConfig::default(), |transferred, total| {
            if transferred == 0 && total == 0 {
                resets_clone.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await
        .expect("second attempt succeeds");
        let _ = handle.join();

        assert_eq!(received, 5);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert!(is_valid_on_disk(&path, &asset.checksum));
    }

    #[tokio::test]
    async fn validation_failure_is_not_retried() {
        let responses = vec![MockResponse {
            status_line: "200 OK",
            body: "not the expected bytes",
        }];
        let (base, hits, handle) = spawn_mock_server(responses);
        let dir = tempfile::tempdir().expect("temp dir");
        let asset = hello_asset(format!("{base}/hello.bin"), dir.path().join("hello.bin"));

        let result = download_file(&asset, &DownloadConfig::default(), |_, _| {}).await;
        let _ = handle.join();

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_error_is_fatal_and_leaves_no_file() {
        let responses = vec![MockResponse {
            status_line: "404 Not Found",
            body: "",
        }];
        let (base, hits, handle) = spawn_mock_server(responses);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("hello.bin");
        let asset = hello_asset(format!("{base}/hello.bin"), path.clone());

        let result = download_file(&asset, &DownloadConfig::default(), |_, _| {}).await;
        let _ = handle.join();

        assert!(matches!(
            result,
            Err(Error::HttpResponseNotSuccess(404, _))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn queue_reports_aggregate_bytes_and_received_totals() {
        let responses = vec![
            MockResponse {
                status_line: "200 OK",
                body: "hello",
            },
            MockResponse {
                status_line: "200 OK",
                body: "hello",
            },
        ];
        let (base, _hits, handle) = spawn_mock_server(responses);
        let dir = tempfile::tempdir().expect("temp dir");
        let first = Asset {
            id: "first".to_string(),
            ..hello_asset(format!("{base}/a.bin"), dir.path().join("a.bin"))
        };
        let second = Asset {
            id: "second".to_string(),
            ..hello_asset(format!("{base}/b.bin"), dir.path().join("b.bin"))
        };

        let config = DownloadConfig {
            // the mock server accepts connections one at a time
            concurrency: 1,
            ..DownloadConfig::default()
        };
        let peak = Arc::new(AtomicU64::new(0));
        let peak_clone = peak.clone();
        let received = download_all(vec![first, second], &config, |aggregate| {
            peak_clone.fetch_max(aggregate, Ordering::SeqCst);
        })
        .await
        .expect("queue");
        let _ = handle.join();

        assert_eq!(received.get("first"), Some(&5));
        assert_eq!(received.get("second"), Some(&5));
        assert_eq!(peak.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn filter_keeps_missing_and_mismatched() {
        let dir = tempfile::tempdir().expect("temp dir");
        let good = dir.path().join("good.bin");
        std::fs::write(&good, b"hello").expect("write");
        let assets = vec![
            hello_asset("http://unused/a".to_string(), good),
            hello_asset("http://unused/b".to_string(), dir.path().join("missing.bin")),
        ];
        let invalid = filter_invalid_assets(assets);
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].path.ends_with("missing.bin"));
    }
}
