// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Browser loader runtime
//!
//! The prelude defines three globals:
//!
//! - `define(name, payload)` registers a module's source text without running it
//! - `require(name)` instantiates a module on first use and returns its exports
//! - `execute({module, fn, args})` defers a call until `module` is defined
//!
//! Queued calls are flushed from a zero-delay timer, so a page can emit
//! `execute` statements before the bundle that defines their modules has
//! arrived.

use crate::module::{ModuleRef, ScriptModule};
use std::sync::Arc;

/// Loader runtime source
pub const PRELUDE: &str = include_str!("assets/prelude.js");

/// Module name the prelude is registered under
pub const PRELUDE_MODULE: &str = "prelude";

/// The prelude as a module, for providers that serve it like any script
pub fn prelude_module() -> ModuleRef {
    Arc::new(ScriptModule::new(PRELUDE_MODULE, PRELUDE))
}
