// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Cached-with-remote-fallback loading for index documents.

use std::path::Path;

use log::debug;

use download::Checksum;
use shared::HTTP_CLIENT;

use crate::error::*;

/// Fetches a document, raising on non-success status.
pub async fn fetch_document(url: &str) -> Result<Vec<u8>> {
    let response = HTTP_CLIENT.get(url).send().await.map_err(download::Error::from)?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::DocumentFetch(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown").to_string(),
        ));
    }
    Ok(response
        .bytes()
        .await
        .map_err(download::Error::from)?
        .to_vec())
}

/// Writes a document below its final path, directory-create first, rename
/// last so readers never observe a torn file.
pub async fn persist_document(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let part = path.with_file_name(format!("{name}.part"));
    tokio::fs::write(&part, bytes).await?;
    tokio::fs::rename(&part, path).await?;
    Ok(())
}

/// The cached-with-remote-fallback discipline: use the local copy when it
/// exists and, if a hash is known, still matches; otherwise fetch the
/// remote, persist it and use that.
pub async fn load_cached_document(
    path: &Path,
    url: &str,
    sha1: Option<&str>,
) -> Result<Vec<u8>> {
    if path.is_file() {
        let usable = match sha1 {
            Some(sha1) => {
                download::verify_file(path, &Checksum::Sha1(sha1.to_lowercase())) == Some(true)
            }
            None => true,
        };
        if usable {
            debug!("Using cached document {}", path.display());
            return Ok(tokio::fs::read(path).await?);
        }
    }
    let bytes = fetch_document(url).await?;
    persist_document(path, &bytes).await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cached_copy_short_circuits_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexes").join("1.15.json");
        persist_document(&path, b"{\"objects\":{}}").await.unwrap();

        // sha1 of b"{\"objects\":{}}"
        let sha1 = {
            let mut hasher = sha1_smol::Sha1::new();
            hasher.update(b"{\"objects\":{}}");
            hasher.digest().to_string()
        };
        // the url is unreachable on purpose, the cache must win
        let bytes = load_cached_document(&path, "http://127.0.0.1:9/x.json", Some(&sha1))
            .await
            .unwrap();
        assert_eq!(bytes, b"{\"objects\":{}}");
    }

    #[tokio::test]
    async fn stale_cache_with_unreachable_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.15.json");
        persist_document(&path, b"stale").await.unwrap();

        let result = load_cached_document(
            &path,
            "http://127.0.0.1:9/x.json",
            Some("0000000000000000000000000000000000000000"),
        )
        .await;
        assert!(result.is_err());
    }
}
