// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::{io::Read, path::Path};

use serde::{Deserialize, Serialize};
use sha2::Digest;

/// An expected content digest, lower-case hex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Checksum {
    Sha1(String),
    Sha256(String),
    Md5(String),
    None,
}

impl Checksum {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Sha1(_) => "sha1",
            Self::Sha256(_) => "sha256",
            Self::Md5(_) => "md5",
            Self::None => "none",
        }
    }
}

pub(crate) enum Hasher {
    Sha1(sha1_smol::Sha1),
    Sha256(sha2::Sha256),
    Md5(md5::Md5),
    None,
}

impl From<&Checksum> for Hasher {
    fn from(value: &Checksum) -> Self {
        match value {
            Checksum::Sha1(_) => Self::Sha1(sha1_smol::Sha1::new()),
            Checksum::Sha256(_) => Self::Sha256(sha2::Sha256::new()),
            Checksum::Md5(_) => Self::Md5(md5::Md5::new()),
            Checksum::None => Self::None,
        }
    }
}

impl Hasher {
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(sha1_hasher) => sha1_hasher.update(data),
            Self::Sha256(sha256_hasher) => sha256_hasher.update(data),
            Self::Md5(md5_hasher) => md5_hasher.update(data),
            Self::None => (),
        }
    }

    pub(crate) fn verify(self, checksum: &Checksum) -> bool {
        match (self, checksum) {
            (Self::Sha1(sha1_hasher), Checksum::Sha1(sha1_checksum)) => {
                &sha1_hasher.digest().to_string() == sha1_checksum
            }
            (Self::Sha256(sha256_hasher), Checksum::Sha256(sha256_checksum)) => {
                &format!("{:x}", sha256_hasher.finalize()) == sha256_checksum
            }
            (Self::Md5(md5_hasher), Checksum::Md5(md5_checksum)) => {
                &format!("{:x}", md5_hasher.finalize()) == md5_checksum
            }
            (Self::None, Checksum::None) => true,
            _ => false,
        }
    }
}

/// Streams `source` through the checksum's hasher. `None` when the checksum
/// carries no digest to compare against or the source cannot be read.
pub fn verify_checksum_from_read<R: Read>(source: &mut R, checksum: &Checksum) -> Option<bool> {
    if checksum == &Checksum::None {
        return None;
    }
    let mut hasher = Hasher::from(checksum);
    let mut buffer = [0; 8192];
    loop {
        let bytes_read = source.read(&mut buffer).ok()?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Some(hasher.verify(checksum))
}

/// Streaming hash-compare of a file on disk.
pub fn verify_file(path: &Path, checksum: &Checksum) -> Option<bool> {
    let mut file = std::fs::File::open(path).ok()?;
    verify_checksum_from_read(&mut file, checksum)
}

/// `true` iff the file exists and its content hashes to the expected digest.
/// Without a digest to compare against, existence is all that can be asked.
pub fn is_valid_on_disk(path: &Path, checksum: &Checksum) -> bool {
    match checksum {
        Checksum::None => path.is_file(),
        _ => path.is_file() && verify_file(path, checksum) == Some(true),
    }
}
