// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Unpacking a downloaded JDK archive next to the other runtimes.

use std::{
    fs,
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use log::info;

use crate::discover::executable_relative_path;
use crate::error::*;

/// Extracts `archive` (zip or tar.gz) into `destination` and returns the
/// path of the Java executable inside the archive's top-level directory.
pub async fn install_jdk_archive(archive: &Path, destination: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(destination).await?;
    let staging = destination.join(format!(".extract-{}", uuid::Uuid::new_v4()));

    let archive_path = archive.to_path_buf();
    let staging_path = staging.clone();
    let top_level = tokio::task::spawn_blocking(move || extract_archive(&archive_path, &staging_path))
        .await
        .map_err(|error| Error::ExtractionTask(error.to_string()))??;

    let installed = destination.join(&top_level);
    if installed.exists() {
        fs::remove_dir_all(&installed)?;
    }
    fs::rename(staging.join(&top_level), &installed)?;
    let _ = fs::remove_dir_all(&staging);

    info!("Installed Java runtime at {}", installed.display());
    Ok(installed.join(executable_relative_path()))
}

fn extract_archive(archive: &Path, staging: &Path) -> Result<String> {
    fs::create_dir_all(staging)?;
    let name = archive.to_string_lossy();
    if name.ends_with(".zip") {
        extract_zip(archive, staging)?;
    } else {
        extract_tar_gz(archive, staging)?;
    }
    first_top_level_directory(staging)
}

fn extract_zip(archive: &Path, staging: &Path) -> Result<()> {
    let file = fs::File::open(archive)?;
    let mut archive = zip::ZipArchive::new(file)?;
    archive.extract(staging)?;
    Ok(())
}

fn extract_tar_gz(archive: &Path, staging: &Path) -> Result<()> {
    let tar_gz = fs::File::open(archive)?;
    let tar = GzDecoder::new(std::io::BufReader::new(tar_gz));
    let mut archive = tar::Archive::new(tar);
    archive.unpack(staging)?;
    Ok(())
}

fn first_top_level_directory(staging: &Path) -> Result<String> {
    fs::read_dir(staging)?
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .ok_or(Error::EmptyArchive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_tar_gz(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let body = b"#!";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("jdk-17.0.6/{}", executable_relative_path()),
                &body[..],
            )
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_zip(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer
            .start_file(format!("jdk-21.0.1/{}", executable_relative_path()), options)
            .unwrap();
        writer.write_all(b"#!").unwrap();
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn tar_gz_archive_installs() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("jdk.tar.gz");
        write_tar_gz(&archive);

        let destination = dir.path().join("runtime").join("x64");
        let executable = install_jdk_archive(&archive, &destination).await.unwrap();
        assert_eq!(
            executable,
            destination.join("jdk-17.0.6").join(executable_relative_path())
        );
        assert!(executable.is_file());
    }

    #[tokio::test]
    async fn zip_archive_installs() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("jdk.zip");
        write_zip(&archive);

        let destination = dir.path().join("runtime").join("x64");
        let executable = install_jdk_archive(&archive, &destination).await.unwrap();
        assert_eq!(
            executable,
            destination.join("jdk-21.0.1").join(executable_relative_path())
        );
        assert!(executable.is_file());
    }
}
