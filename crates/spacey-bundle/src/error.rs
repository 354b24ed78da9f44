// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for bundling

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundler operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while resolving, packaging or storing bundles
#[derive(Debug, Error)]
pub enum BundleError {
    /// No provider knows a module (or bundle) by this name
    #[error("module {0} was not found")]
    NotFound(String),

    /// A module was registered without a name
    #[error("module does not have a name")]
    MissingName,

    /// A module name was registered twice
    #[error("module {0} already exists")]
    AlreadyExists(String),

    /// Remote module content could not be fetched
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// The URL being fetched
        url: String,
        /// Underlying HTTP failure
        #[source]
        source: reqwest::Error,
    },

    /// File-backed module content could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// A JSON module value could not be encoded
    #[error("failed to encode JSON module {module}: {reason}")]
    Encode {
        /// Module name
        module: String,
        /// Why encoding failed
        reason: String,
    },

    /// A transform rejected its input
    #[error("transform failed: {0}")]
    Transform(String),

    /// A bundle request path does not have the expected shape
    #[error("invalid bundle url: {0}")]
    MalformedRequest(String),

    /// The content store failed to read or write
    #[error("content store error: {0}")]
    Store(String),

    /// IO error outside of module reads
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl BundleError {
    /// Create a module not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a transform error
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create a content store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Whether this error only says that something does not exist.
    ///
    /// Provider chains fall through to the next provider on these and abort
    /// on everything else.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = BundleError::not_found("foo");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("foo"));

        assert!(!BundleError::MissingName.is_not_found());
        assert!(!BundleError::store("disk full").is_not_found());
    }
}
