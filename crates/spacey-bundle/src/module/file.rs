// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Modules read from disk

use super::{parse_require, Module};
use crate::error::{BundleError, Result};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// A module backed by a file.
///
/// By default the file is read again on every call so edits show up in the
/// next bundle. [`FileModule::memoized`] keeps the first successful read.
pub struct FileModule {
    name: String,
    path: PathBuf,
    memoize: bool,
    content: OnceCell<Bytes>,
    require: OnceCell<Vec<String>>,
}

impl FileModule {
    /// Create a module that re-reads `path` whenever it is used
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::build(name.into(), path.into(), false)
    }

    /// Create a module that reads `path` once
    pub fn memoized(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::build(name.into(), path.into(), true)
    }

    fn build(name: String, path: PathBuf, memoize: bool) -> Self {
        Self {
            name,
            path,
            memoize,
            content: OnceCell::new(),
            require: OnceCell::new(),
        }
    }

    /// The backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Bytes> {
        std::fs::read(&self.path)
            .map(Bytes::from)
            .map_err(|source| BundleError::Read {
                path: self.path.clone(),
                source,
            })
    }
}

impl Module for FileModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> Result<Bytes> {
        if self.memoize {
            self.content.get_or_try_init(|| self.read()).cloned()
        } else {
            self.read()
        }
    }

    fn require(&self) -> Result<Vec<String>> {
        if !self.memoize {
            return Ok(parse_require(&self.read()?));
        }
        let content = self.content()?;
        Ok(self
            .require
            .get_or_init(|| parse_require(&content))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_script(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_file_module() {
        let file = temp_script("require('bar')\nrequire('b/baz')\n");
        let m = FileModule::new("foo", file.path());

        assert_eq!(m.name(), "foo");
        assert!(m.content().unwrap().starts_with(b"require"));
        assert_eq!(m.require().unwrap(), vec!["bar", "b/baz"]);
    }

    #[test]
    fn test_file_module_rereads() {
        let file = temp_script("one");
        let m = FileModule::new("foo", file.path());
        assert_eq!(&m.content().unwrap()[..], b"one");

        std::fs::write(file.path(), "two").unwrap();
        assert_eq!(&m.content().unwrap()[..], b"two");
    }

    #[test]
    fn test_file_module_memoized() {
        let file = temp_script("require('a')");
        let m = FileModule::memoized("foo", file.path());
        assert_eq!(m.require().unwrap(), vec!["a"]);

        std::fs::write(file.path(), "require('b')").unwrap();
        assert_eq!(&m.content().unwrap()[..], b"require('a')");
        assert_eq!(m.require().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_file_module_missing() {
        let m = FileModule::new("foo", "does/not/exist.js");
        let err = m.content().unwrap_err();
        assert!(matches!(err, BundleError::Read { .. }));
        assert!(!err.is_not_found());
    }
}
