// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! HTTP/1 connection loop

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::{Result, ServerError};
use crate::handler::{BundleHandler, BundleResponse, CONTENT_TYPE_TEXT, INTERNAL_ERROR_MESSAGE};

/// Serves bundles over HTTP
#[derive(Clone)]
pub struct BundleServer {
    handler: BundleHandler,
}

impl BundleServer {
    /// Create a server answering with `handler`
    pub fn new(handler: BundleHandler) -> Self {
        Self { handler }
    }

    /// Bind `addr` and serve until `shutdown` resolves
    pub async fn bind_and_serve(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr.to_string()))?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!("Bundle server listening on {}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let server = self.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let server = server.clone();
                            async move { Ok::<_, Infallible>(server.handle(req).await) }
                        });
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            debug!("Connection from {} ended: {}", peer, e);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Bundle server shutting down");
                    return Ok(());
                }
            }
        }
    }

    async fn handle(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let head_only = match *req.method() {
            Method::GET => false,
            Method::HEAD => true,
            _ => return method_not_allowed(),
        };

        // Store lookups may touch the filesystem.
        let handler = self.handler.clone();
        let path = req.uri().path().to_string();
        let response = tokio::task::spawn_blocking(move || handler.respond(&path))
            .await
            .unwrap_or_else(|e| {
                error!("Bundle lookup failed: {}", e);
                BundleResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    content_type: CONTENT_TYPE_TEXT,
                    body: Bytes::from_static(INTERNAL_ERROR_MESSAGE.as_bytes()),
                }
            });

        debug!("{} {} -> {}", req.method(), req.uri().path(), response.status);
        build_response(response, head_only)
    }
}

fn build_response(response: BundleResponse, head_only: bool) -> Response<Full<Bytes>> {
    let length = response.body.len();
    let body = if head_only { Bytes::new() } else { response.body };

    let mut http = Response::new(Full::new(body));
    *http.status_mut() = response.status;
    let headers = http.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(response.content_type));
    headers.insert(CONTENT_LENGTH, length.into());
    http
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    let mut http = Response::new(Full::new(Bytes::from_static(b"method not allowed\n")));
    *http.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    http.headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    http.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT));
    http
}
