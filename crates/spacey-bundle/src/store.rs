// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content-addressable bundle store.
//!
//! Bundles are stored under a short hash of their exact bytes, so the same
//! bundle always lands under the same key and entries never need to be
//! invalidated.
//!
//! Directory layout:
//! ```text
//! <store_dir>/
//! ├── 56cc634.js
//! ├── a102771.js
//! └── ...
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{BundleError, Result};

/// Number of hex characters of the digest used as key
pub const HASH_LENGTH: usize = 7;

/// Extension of bundle files and URLs
pub const EXTENSION: &str = ".js";

/// Compute the store key of `content`: the leading hex characters of its
/// SHA-256 digest.
pub fn content_key(content: &[u8]) -> String {
    let mut key = hex::encode(Sha256::digest(content));
    key.truncate(HASH_LENGTH);
    key
}

/// Storage for minted bundles
pub trait ContentStore: Send + Sync {
    /// Insert or overwrite the entry for `key`
    fn store(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Fetch the entry for `key`. A missing entry is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Bytes>>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bundles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn store(&self, key: &str, content: &[u8]) -> Result<()> {
        self.entries
            .insert(key.to_string(), Bytes::copy_from_slice(content));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }
}

/// Store keeping one file per bundle in a directory
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(BundleError::store(format!("invalid key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}{EXTENSION}")))
    }
}

impl ContentStore for DirStore {
    fn store(&self, key: &str, content: &[u8]) -> Result<()> {
        let path = self.entry_path(key)?;

        // Readers must never observe a partially written bundle.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| BundleError::store(format!("create temp file: {e}")))?;
        tmp.write_all(content)
            .map_err(|e| BundleError::store(format!("write {key}: {e}")))?;
        tmp.persist(&path)
            .map_err(|e| BundleError::store(format!("persist {key}: {}", e.error)))?;

        debug!("Stored bundle {} at {}", key, path.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(_) => return Ok(None),
        };
        match fs::read(&path) {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BundleError::store(format!("read {}: {e}", path.display()))),
        }
    }
}
