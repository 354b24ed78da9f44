// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the bundle server

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or accepting on the listen socket failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The listen address could not be parsed
    #[error("invalid listen address {0}")]
    InvalidAddress(String),
}
