// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Modules whose content lives behind a URL

use super::{parse_require, Module};
use crate::error::{BundleError, Result};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use tracing::debug;

/// A module fetched over HTTP the first time its content is needed.
///
/// A failed fetch is not cached; the next call tries again. Uses the
/// blocking client, so call it from a blocking context when inside tokio.
pub struct UrlModule {
    name: String,
    url: String,
    content: OnceCell<Bytes>,
    require: OnceCell<Vec<String>>,
}

impl UrlModule {
    /// Create a module named `name` backed by `url`
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            content: OnceCell::new(),
            require: OnceCell::new(),
        }
    }

    /// The URL this module is fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Bytes> {
        debug!("Fetching module {} from {}", self.name, self.url);
        let get = || -> reqwest::Result<Bytes> {
            reqwest::blocking::get(&self.url)?
                .error_for_status()?
                .bytes()
        };
        get().map_err(|source| BundleError::Fetch {
            url: self.url.clone(),
            source,
        })
    }
}

impl Module for UrlModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> Result<Bytes> {
        self.content.get_or_try_init(|| self.fetch()).cloned()
    }

    fn require(&self) -> Result<Vec<String>> {
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

    #[test]
    fn test_url_module_name() {
        let m = UrlModule::new("bootstrap", "https://example.invalid/bootstrap.min.js");
        assert_eq!(m.name(), "bootstrap");
        assert_eq!(m.url(), "https://example.invalid/bootstrap.min.js");
    }

    #[test]
    fn test_url_module_invalid_url() {
        let err = UrlModule::new("foo", "foo").content().unwrap_err();
        assert!(matches!(err, BundleError::Fetch { .. }));
    }

    #[test]
    fn test_url_module_invalid_require() {
        assert!(UrlModule::new("foo", "foo").require().is_err());
    }
}
