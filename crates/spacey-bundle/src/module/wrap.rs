// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Wrapping third party scripts into CommonJS shape

use super::{Module, ModuleRef};
use crate::error::Result;
use bytes::{Bytes, BytesMut};

/// Splices bytes before and after another module's content.
///
/// Useful to adapt scripts that export through globals, e.g. appending
/// `module.exports = jQuery.noConflict()`.
pub struct WrapModule {
    inner: ModuleRef,
    prelude: Bytes,
    postlude: Bytes,
}

impl WrapModule {
    /// Wrap `inner` with the given prelude and postlude
    pub fn new(inner: ModuleRef, prelude: impl Into<Bytes>, postlude: impl Into<Bytes>) -> Self {
        Self {
            inner,
            prelude: prelude.into(),
            postlude: postlude.into(),
        }
    }
}

impl Module for WrapModule {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn content(&self) -> Result<Bytes> {
        let inner = self.inner.content()?;
        let mut buf = BytesMut::with_capacity(self.prelude.len() + inner.len() + self.postlude.len());
        buf.extend_from_slice(&self.prelude);
        buf.extend_from_slice(&inner);
        buf.extend_from_slice(&self.postlude);
        Ok(buf.freeze())
    }

    fn require(&self) -> Result<Vec<String>> {
        self.inner.require()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ScriptModule;
    use std::sync::Arc;

    #[test]
    fn test_wrap_module() {
        let inner = Arc::new(ScriptModule::new("foo", "require('baz')"));
        let m = WrapModule::new(inner, "prelude", "postlude");

        assert_eq!(m.name(), "foo");
        assert_eq!(&m.content().unwrap()[..], b"preluderequire('baz')postlude");
        assert_eq!(m.require().unwrap(), vec!["baz"]);
    }

    #[test]
    fn test_wrap_module_empty_prelude() {
        let inner = Arc::new(ScriptModule::new("jquery", "var jQuery = {}"));
        let m = WrapModule::new(inner, Bytes::new(), "\nmodule.exports = jQuery");
        assert_eq!(
            &m.content().unwrap()[..],
            b"var jQuery = {}\nmodule.exports = jQuery"
        );
    }
}
