//! The I/O seam between the executor and the network.
//!
//! # Design
//! The executor never talks to an HTTP library directly. It hands a plain
//! `HttpRequest` to a `Transport` and gets a plain `HttpResponse` back, with
//! the body already read in full. Tests inject doubles here; production code
//! uses `ReqwestTransport`, or wraps a custom `reqwest::Client` (proxy, TLS
//! roots, timeouts) with `ReqwestTransport::from_client`.
//!
//! Implementations must be safe to share between concurrent requests. Both
//! suspension points of a request (round trip and body read) live inside
//! `send`, so dropping the returned future cancels the whole request.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Verb};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and return the response with its full body.
    ///
    /// Any HTTP status is a successful `send`; only failures to obtain a
    /// response are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
