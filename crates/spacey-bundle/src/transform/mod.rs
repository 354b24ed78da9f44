// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content transforms (minification, optimization)
//!
//! A transform rewrites script bytes. It is applied to the loader prelude and
//! to every packaged module independently, so it must not depend on state
//! from a previous call.

mod closure;
mod jsmin;

pub use closure::{ClosureCompiler, CompilationLevel};
pub use jsmin::JsMin;

use crate::error::Result;
use std::sync::Arc;

/// A pure content-to-content rewrite
pub trait Transform: Send + Sync {
    /// Rewrite `content`
    fn transform(&self, content: &[u8]) -> Result<Vec<u8>>;
}

/// Applies transforms left to right
#[derive(Default, Clone)]
pub struct TransformChain {
    steps: Vec<Arc<dyn Transform>>,
}

impl TransformChain {
    /// Create an empty chain, which returns its input unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then(mut self, step: Arc<dyn Transform>) -> Self {
        self.steps.push(step);
        self
    }
}

impl Transform for TransformChain {
    fn transform(&self, content: &[u8]) -> Result<Vec<u8>> {
        let mut current = content.to_vec();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

/// Run `content` through an optional transform
pub(crate) fn apply(transform: Option<&Arc<dyn Transform>>, content: &[u8]) -> Result<Vec<u8>> {
    match transform {
        Some(t) => t.transform(content),
        None => Ok(content.to_vec()),
    }
}
