// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Page script blocks.

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::error::Result;
use crate::package::js_json;

/// A deferred function call on a module's exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Module whose exports hold the function
    pub module: String,
    /// Exported function name
    #[serde(rename = "fn")]
    pub function: String,
    /// JSON arguments
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl Call {
    /// Create a call
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            args,
        }
    }

    /// The inline `execute({...});` statement for this call
    pub fn statement(&self) -> Result<String> {
        Ok(format!("execute({});", js_json(self, &self.module)?))
    }
}

/// Rendered script blocks for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScripts {
    /// Loader runtime source
    pub prelude: String,
    /// `execute` statements, one per line
    pub calls: String,
    /// Bundle URL
    pub src: String,
}

impl PageScripts {
    /// Render as markup: the inline prelude, the inline calls, then the
    /// async bundle script.
    pub fn html(&self) -> String {
        format!(
            "<script>{}</script><script>{}</script><script async src=\"{}\"></script>",
            self.prelude,
            self.calls,
            escape_attr(&self.src)
        )
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Script blocks for a set of calls against an [`App`]
pub struct AppScripts<'a> {
    app: &'a App,
    calls: Vec<Call>,
}

impl<'a> AppScripts<'a> {
    /// Create an empty set of calls
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            calls: Vec::new(),
        }
    }

    /// Queue a call
    pub fn call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    /// Mint the bundle for every called module and render the script blocks.
    ///
    /// The bundle roots are the called modules in first-call order.
    pub fn render(&self) -> Result<PageScripts> {
        let mut modules: Vec<&str> = Vec::new();
        let mut calls = Vec::with_capacity(self.calls.len());
        for call in &self.calls {
            if !modules.contains(&call.module.as_str()) {
                modules.push(&call.module);
            }
            calls.push(call.statement()?);
        }

        let prelude = self.app.script_prelude()?;
        Ok(PageScripts {
            prelude: String::from_utf8_lossy(&prelude).into_owned(),
            calls: calls.join("\n"),
            src: self.app.modules_url(&modules)?,
        })
    }

    /// Render straight to markup
    pub fn html(&self) -> Result<String> {
        Ok(self.render()?.html())
    }
}
