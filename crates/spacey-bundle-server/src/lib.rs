// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # Spacey Bundle Server
//!
//! Serves bundles minted by [`spacey_bundle::App`] from their content store.
//!
//! | Request | Status | Body |
//! |---|---|---|
//! | base name is not `<7 chars>.js` | 404 | `invalid url` |
//! | store lookup failed | 500 | `internal error` |
//! | no such bundle | 404 | `not found` |
//! | bundle exists | 200 | bundle bytes, `text/javascript` |

pub mod error;
pub mod handler;
pub mod server;

pub use error::{Result, ServerError};
pub use handler::{BundleHandler, BundleResponse};
pub use server::BundleServer;
