// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Minification through the Closure Compiler web service

use super::Transform;
use crate::error::{BundleError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Closure Compiler service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://closure-compiler.appspot.com/compile";

/// Compilation levels offered by the Closure Compiler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompilationLevel {
    /// Only strip whitespace and comments
    #[serde(rename = "WHITESPACE_ONLY")]
    Whitespace,
    /// Local renaming and dead code removal
    #[default]
    #[serde(rename = "SIMPLE_OPTIMIZATIONS")]
    Simple,
    /// Whole program optimization
    #[serde(rename = "ADVANCED_OPTIMIZATIONS")]
    Advanced,
}

impl CompilationLevel {
    /// The wire name of the level
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whitespace => "WHITESPACE_ONLY",
            Self::Simple => "SIMPLE_OPTIMIZATIONS",
            Self::Advanced => "ADVANCED_OPTIMIZATIONS",
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompileResponse {
    #[serde(rename = "compiledCode")]
    compiled_code: String,
}

/// Remote minifier backed by the Closure Compiler service
#[derive(Debug, Clone)]
pub struct ClosureCompiler {
    level: CompilationLevel,
    endpoint: String,
}

impl ClosureCompiler {
    /// Create a compiler using `level` and the public endpoint
    pub fn new(level: CompilationLevel) -> Self {
        Self {
            level,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Use a different service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The configured compilation level
    pub fn level(&self) -> CompilationLevel {
        self.level
    }

    fn form<'a>(&self, code: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("js_code", code),
            ("compilation_level", self.level.as_str()),
            ("output_format", "json"),
            ("output_info", "compiled_code"),
        ]
    }
}

impl Default for ClosureCompiler {
    fn default() -> Self {
        Self::new(CompilationLevel::default())
    }
}

impl Transform for ClosureCompiler {
    fn transform(&self, content: &[u8]) -> Result<Vec<u8>> {
        let code = String::from_utf8_lossy(content);
        debug!(
            "Compiling {} bytes with Closure ({})",
            content.len(),
            self.level.as_str()
        );

        let response = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .form(&self.form(&code))
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<CompileResponse>())
            .map_err(|e| BundleError::transform(format!("closure compiler: {e}")))?;

        Ok(response.compiled_code.into_bytes())
    }
}
