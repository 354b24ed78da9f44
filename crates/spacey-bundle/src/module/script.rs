// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Modules with inline content

use super::{parse_require, Module};
use crate::error::Result;
use bytes::Bytes;
use once_cell::sync::OnceCell;

/// A module whose content is known up front
pub struct ScriptModule {
    name: String,
    content: Bytes,
    require: OnceCell<Vec<String>>,
}

impl ScriptModule {
    /// Create a module from a name and its script content
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            require: OnceCell::new(),
        }
    }
}

impl Module for ScriptModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> Result<Bytes> {
        Ok(self.content.clone())
    }

    fn require(&self) -> Result<Vec<String>> {
        Ok(self
            .require
            .get_or_init(|| parse_require(&self.content))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_module() {
        let m = ScriptModule::new("foo", "require('baz')");
        assert_eq!(m.name(), "foo");
        assert_eq!(&m.content().unwrap()[..], b"require('baz')");
        assert_eq!(m.require().unwrap(), vec!["baz"]);
    }

    #[test]
    fn test_script_module_require_is_stable() {
        let m = ScriptModule::new("bar", "require('foo'); require(\"baz\")");
        assert_eq!(m.require().unwrap(), m.require().unwrap());
    }
}
