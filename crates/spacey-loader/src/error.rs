// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the loader

use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors raised by `define`, `require` and deferred calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// `define` was called for a name that is already defined or instantiated
    #[error("module {0} already defined")]
    AlreadyDefined(String),

    /// `require` found neither an instance nor a payload
    #[error("module {0} not found")]
    NotFound(String),

    /// A deferred call named an export that is not a function
    #[error("{module}.{function} is not a function")]
    NotAFunction {
        /// Module name
        module: String,
        /// Export name
        function: String,
    },

    /// A payload or exported function failed
    #[error("{0}")]
    Thrown(String),
}

impl LoaderError {
    /// Create an error thrown from script code
    pub fn thrown(msg: impl Into<String>) -> Self {
        Self::Thrown(msg.into())
    }
}
