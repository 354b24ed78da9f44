// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # Spacey Loader
//!
//! The browser loader runtime shipped in bundles, modelled in Rust.
//!
//! Payloads are Rust closures instead of script source, and the page's
//! `setTimeout` queue is an [`EventLoop`] driven by [`Loader::run_pending`].
//! Otherwise the state machine is the one the prelude implements:
//!
//! ```
//! use spacey_bundle::Call;
//! use spacey_loader::Loader;
//! use serde_json::json;
//!
//! let loader = Loader::new();
//! // Calls may arrive before the module they target.
//! loader.execute(Call::new("greeter", "hello", vec![json!("world")]));
//!
//! loader.define("greeter", |_, module| {
//!     module.exports().function("hello", |args| Ok(args[0].clone()));
//!     Ok(())
//! })?;
//! loader.run_pending()?;
//! # Ok::<(), spacey_loader::LoaderError>(())
//! ```

pub mod error;
pub mod event_loop;
pub mod exports;
pub mod loader;

pub use error::{LoaderError, Result};
pub use event_loop::{EventLoop, TimerId};
pub use exports::{Export, Exports, Function, ModuleRecord};
pub use loader::{FlushStats, Loader, Payload};
