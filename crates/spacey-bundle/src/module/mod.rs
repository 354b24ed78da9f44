// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS modules
//!
//! A module is a name plus script content. Its dependencies are whatever
//! literal `require('name')` / `require("name")` calls appear in the content.
//! Computed requires such as `require(prefix + 'x')` are invisible to the
//! bundler, which lets application code load modules it deliberately keeps
//! out of a bundle.
//!
//! Backing strategies:
//! - [`ScriptModule`]: inline content
//! - [`JsonModule`]: a serialized value exposed as `exports.module`
//! - [`UrlModule`]: content fetched over HTTP, memoized after the first fetch
//! - [`FileModule`]: content read from disk
//! - [`WrapModule`]: another module with bytes spliced around its content

mod file;
mod json;
mod remote;
mod script;
mod wrap;

pub use file::FileModule;
pub use json::JsonModule;
pub use remote::UrlModule;
pub use script::ScriptModule;
pub use wrap::WrapModule;

use crate::error::Result;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fmt;
use std::sync::Arc;

static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\(['"](.+?)['"]\)"#).expect("require pattern is valid")
});

/// A named unit of script content
pub trait Module: Send + Sync {
    /// The module name, e.g. `a/foo`
    fn name(&self) -> &str;

    /// The raw script content
    fn content(&self) -> Result<Bytes>;

    /// Names of the modules this one requires, in first-occurrence order
    fn require(&self) -> Result<Vec<String>>;
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name()).finish()
    }
}

/// Shared handle to a module
pub type ModuleRef = Arc<dyn Module>;

/// Scan script content for literal `require()` calls.
///
/// Names are returned in the order they first appear; repeated requires are
/// kept. The names are never resolved here.
pub fn parse_require(content: &[u8]) -> Vec<String> {
    REQUIRE_CALL
        .captures_iter(content)
        .map(|caps| String::from_utf8_lossy(&caps[1]).into_owned())
        .collect()
}
