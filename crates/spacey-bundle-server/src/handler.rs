// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundle lookup by request path

use std::sync::Arc;

use bytes::Bytes;
use hyper::StatusCode;
use spacey_bundle::ContentStore;
use spacey_bundle::store::{EXTENSION, HASH_LENGTH};
use tracing::{debug, error};

/// Content type of a served bundle
pub const CONTENT_TYPE_JAVASCRIPT: &str = "text/javascript";
/// Content type of error bodies
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Body for a path that cannot name a bundle
pub const INVALID_URL_MESSAGE: &str = "invalid url\n";
/// Body for a well-formed key with no stored bundle
pub const NOT_FOUND_MESSAGE: &str = "not found\n";
/// Body for a store failure; the detail is only logged
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error\n";

/// Status, content type and body of a bundle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Content-Type header value
    pub content_type: &'static str,
    /// Response body
    pub body: Bytes,
}

impl BundleResponse {
    fn text(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: Bytes::from_static(message.as_bytes()),
        }
    }
}

/// Serves bundles out of a content store
#[derive(Clone)]
pub struct BundleHandler {
    store: Arc<dyn ContentStore>,
}

impl BundleHandler {
    /// Create a handler reading from `store`
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Answer a request for `path`.
    ///
    /// Only the last path segment is looked at. It must be a store key
    /// followed by `.js`; the directory part is whatever the bundles are
    /// mounted under.
    pub fn respond(&self, path: &str) -> BundleResponse {
        let base = path.rsplit('/').next().unwrap_or(path);
        let Some(key) = base
            .strip_suffix(EXTENSION)
            .filter(|key| key.len() == HASH_LENGTH)
        else {
            debug!("Rejecting bundle path {}", path);
            return BundleResponse::text(StatusCode::NOT_FOUND, INVALID_URL_MESSAGE);
        };

        match self.store.get(key) {
            Ok(Some(content)) => BundleResponse {
                status: StatusCode::OK,
                content_type: CONTENT_TYPE_JAVASCRIPT,
                body: content,
            },
            Ok(None) => BundleResponse::text(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            Err(e) => {
                error!("Failed to read bundle {}: {}", key, e);
                BundleResponse::text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
