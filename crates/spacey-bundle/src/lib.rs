// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # Spacey Bundle
//!
//! CommonJS module bundling for browsers.
//!
//! Named modules and everything they `require()` are resolved through a
//! chain of providers, serialized into a deterministic bundle of
//! `define(name, source)` statements and stored under a hash of the bundle
//! bytes. The resulting URL never changes meaning, so it can be cached
//! forever.
//!
//! ## Example
//!
//! ```no_run
//! use spacey_bundle::{App, DirProvider, MemoryStore};
//! use std::sync::Arc;
//!
//! let app = App::new(Arc::new(MemoryStore::new()))
//!     .with_provider(Arc::new(DirProvider::new("js")));
//! let url = app.modules_url(&["app/main"])?;
//! # Ok::<(), spacey_bundle::BundleError>(())
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod error;
pub mod module;
pub mod package;
pub mod prelude;
pub mod provider;
pub mod resolver;
pub mod scripts;
pub mod store;
pub mod transform;

pub use app::App;
pub use config::{Config, Minify, StoreKind};
pub use error::{BundleError, Result};
pub use module::{
    FileModule, JsonModule, Module, ModuleRef, ScriptModule, UrlModule, WrapModule, parse_require,
};
pub use package::Package;
pub use prelude::{PRELUDE, prelude_module};
pub use provider::{ChainProvider, CustomProvider, DirProvider, Provider, modules_from_dir};
pub use resolver::resolve;
pub use scripts::{AppScripts, Call, PageScripts};
pub use store::{ContentStore, DirStore, MemoryStore, content_key};
pub use transform::{ClosureCompiler, CompilationLevel, JsMin, Transform, TransformChain};
