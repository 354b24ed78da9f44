// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundle serialization
//!
//! A bundle is the optional loader prelude followed by one
//! `define("<name>","<content>");` line per module of the dependency closure,
//! ordered by name. Identical inputs always produce identical bytes, which is
//! what makes the content hash usable as a cache key.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BundleError, Result};
use crate::prelude::PRELUDE;
use crate::provider::Provider;
use crate::resolver::resolve;
use crate::transform::{self, Transform};

/// A set of root modules to be packaged together
pub struct Package<'a> {
    /// Where module names are resolved
    pub provider: &'a dyn Provider,
    /// Root module names
    pub modules: Vec<String>,
    /// Applied to the prelude and to each module's content
    pub transform: Option<Arc<dyn Transform>>,
    /// Emit the loader prelude before the first module
    pub prelude: bool,
}

impl<'a> Package<'a> {
    /// Package `modules` from `provider` without transform or prelude
    pub fn new(provider: &'a dyn Provider, modules: Vec<String>) -> Self {
        Self {
            provider,
            modules,
            transform: None,
            prelude: false,
        }
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: Option<Arc<dyn Transform>>) -> Self {
        self.transform = transform;
        self
    }

    /// Include the loader prelude
    pub fn with_prelude(mut self, prelude: bool) -> Self {
        self.prelude = prelude;
        self
    }

    /// Render the bundle. Any failure aborts the whole bundle.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut names: Vec<String> = resolve(&self.modules, self.provider)?.into_iter().collect();
        names.sort_unstable();

        let mut out = Vec::new();
        if self.prelude {
            out.extend(transform::apply(self.transform.as_ref(), PRELUDE.as_bytes())?);
        }

        for name in &names {
            let module = self.provider.module(name)?;
            let raw = module.content()?;
            let content = transform::apply(self.transform.as_ref(), &raw)?;
            let text = String::from_utf8_lossy(&content);

            out.extend_from_slice(b"define(");
            out.extend(js_json(name.as_str(), name)?.into_bytes());
            out.push(b',');
            out.extend(js_json(text.trim(), name)?.into_bytes());
            out.extend_from_slice(b");\n");
        }

        debug!("Packaged {} modules into {} bytes", names.len(), out.len());
        Ok(out)
    }
}

/// JSON encoding safe to embed in a script element or a JS source file.
///
/// `<`, `>` and `&` are escaped so that markup such as `</script>` cannot
/// terminate an inline script, and U+2028/U+2029 are escaped because older
/// engines reject them inside string literals. All of them only ever appear
/// inside JSON strings, so plain substitution is safe.
pub(crate) fn js_json<T: Serialize + ?Sized>(value: &T, module: &str) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| BundleError::Encode {
        module: module.to_string(),
        reason: e.to_string(),
    })?;
    if !json.contains(['<', '>', '&', '\u{2028}', '\u{2029}']) {
        return Ok(json);
    }

    let mut escaped = String::with_capacity(json.len() + 16);
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleRef, ScriptModule};
    use crate::provider::ChainProvider;
    use crate::transform::JsMin;

    fn script(name: &str, content: &'static str) -> ModuleRef {
        Arc::new(ScriptModule::new(name, content))
    }

    fn fixture() -> ChainProvider {
        ChainProvider::new()
            .with_module(script("bar", "bar\n"))
            .with_module(script("b/baz", "require('bar')"))
            .with_module(script("a/foo", "  require('bar')\nrequire('b/baz')\n\n"))
    }

    #[test]
    fn test_package_sorted_and_trimmed() {
        let p = fixture();
        let content = Package::new(&p, vec!["a/foo".into()]).content().unwrap();
        assert_eq!(
            String::from_utf8(content).unwrap(),
            "define(\"a/foo\",\"require('bar')\\nrequire('b/baz')\");\n\
             define(\"b/baz\",\"require('bar')\");\n\
             define(\"bar\",\"bar\");\n"
        );
    }

    #[test]
    fn test_package_is_deterministic() {
        let p = fixture();
        let one = Package::new(&p, vec!["b/baz".into(), "a/foo".into()]).content().unwrap();
        let two = Package::new(&p, vec!["a/foo".into(), "b/baz".into()]).content().unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_package_single_module() {
        let p = ChainProvider::new().with_module(script("name", "expected"));
        let content = Package::new(&p, vec!["name".into()]).content().unwrap();
        assert_eq!(content, b"define(\"name\",\"expected\");\n");
    }

    #[test]
    fn test_package_with_prelude() {
        let p = ChainProvider::new().with_module(script("name", "x"));
        let content = Package::new(&p, vec!["name".into()])
            .with_prelude(true)
            .content()
            .unwrap();
        assert!(content.starts_with(PRELUDE.as_bytes()));
        assert!(content.ends_with(b"define(\"name\",\"x\");\n"));
    }

    #[test]
    fn test_package_applies_transform() {
        let p = ChainProvider::new().with_module(script("m", "var a = 1 ; // note"));
        let content = Package::new(&p, vec!["m".into()])
            .with_transform(Some(Arc::new(JsMin)))
            .content()
            .unwrap();
        assert_eq!(content, b"define(\"m\",\"var a=1;\");\n");
    }

    #[test]
    fn test_package_missing_module_fails() {
        let p = ChainProvider::new().with_module(script("a", "require('gone')"));
        let err = Package::new(&p, vec!["a".into()]).content().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_package_replaces_invalid_utf8() {
        let p = ChainProvider::new().with_module(Arc::new(ScriptModule::new(
            "bin",
            &b"a\xffb"[..],
        )) as ModuleRef);
        let content = Package::new(&p, vec!["bin".into()]).content().unwrap();
        assert_eq!(
            String::from_utf8(content).unwrap(),
            "define(\"bin\",\"a\u{FFFD}b\");\n"
        );
    }

    #[test]
    fn test_js_json_escapes_markup() {
        assert_eq!(
            js_json("</script>&", "m").unwrap(),
            "\"\\u003c/script\\u003e\\u0026\""
        );
        assert_eq!(js_json("a\u{2028}b", "m").unwrap(), "\"a\\u2028b\"");
        assert_eq!(js_json("plain", "m").unwrap(), "\"plain\"");
    }
}
