//! Executes one HTTP request and normalizes its outcome.
//!
//! # Design
//! `RequestExecutor` holds a base address, the headers it attaches to every
//! request, and an `Arc<dyn Transport>` shared by all calls and clones. It has
//! no per-request mutable state, so concurrent calls run independently.
//!
//! Every operation returns an `OperationResult`; nothing is ever raised to
//! the caller. A response of any status is `Completed`. Anything that keeps a
//! usable response from arriving (bad URL, unserializable payload, transport
//! error, cancellation, undeserializable 2xx body) is `Faulted`.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::error::{ConfigError, Fault};
use crate::http::{HttpRequest, HttpResponse, Verb, AUTHORIZATION, CONTENT_TYPE, JSON_UTF8};
use crate::payload::{Body, Payload};
use crate::result::{CompletedRequest, FaultedRequest, OperationResult};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Clone)]
pub struct RequestExecutor {
    base_address: String,
    transport: Arc<dyn Transport>,
    authorization: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_address", &self.base_address)
            .field("authorization", &self.authorization.as_ref().map(|_| "<set>"))
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Create an executor bound to `base_address`.
    ///
    /// Without a `transport` override a default `ReqwestTransport` is used.
    pub fn initialize(
        base_address: &str,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self, ConfigError> {
        validate_base_address(base_address)?;
        Ok(Self {
            base_address: base_address.to_string(),
            transport: transport.map_or_else(default_transport, Ok)?,
            authorization: None,
            default_headers: Vec::new(),
        })
    }

    pub fn from_config(
        config: &ExecutorConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self, ConfigError> {
        let mut executor = Self::initialize(&config.base_address, transport)?;
        let mut authorization = config.authorization.clone();
        for (name, value) in &config.default_headers {
            validate_header(name, value)?;
            if !name.eq_ignore_ascii_case(AUTHORIZATION) {
                executor.default_headers.push((name.clone(), value.clone()));
            } else if authorization.is_none() {
                authorization = Some(value.clone());
            } else {
                return Err(ConfigError::InvalidHeader {
                    name: name.clone(),
                    message: "authorization is already configured".to_string(),
                });
            }
        }
        if let Some(value) = &authorization {
            executor = executor.with_authorization(value)?;
        }
        Ok(executor)
    }

    /// Replace the base address and transport. The previous transport is
    /// dropped once no clone or in-flight request still holds it.
    pub fn reinitialize(
        &mut self,
        base_address: &str,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<(), ConfigError> {
        validate_base_address(base_address)?;
        let transport = transport.map_or_else(default_transport, Ok)?;
        self.base_address = base_address.to_string();
        self.transport = transport;
        Ok(())
    }

    /// A copy of this executor that sends `value` as its `authorization`
    /// header. The transport is shared; `self` is left untouched.
    pub fn with_authorization(&self, value: &str) -> Result<Self, ConfigError> {
        validate_header(AUTHORIZATION, value)?;
        Ok(Self {
            authorization: Some(value.to_string()),
            ..self.clone()
        })
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> OperationResult<T> {
        self.execute(Verb::Get, path, None, cancel).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: impl Into<Payload>,
        cancel: &CancellationToken,
    ) -> OperationResult<T> {
        let body = payload.into().into_body();
        self.execute(Verb::Post, path, Some(body), cancel).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: impl Into<Payload>,
        cancel: &CancellationToken,
    ) -> OperationResult<T> {
        let body = payload.into().into_body();
        self.execute(Verb::Put, path, Some(body), cancel).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> OperationResult<T> {
        self.execute(Verb::Delete, path, None, cancel).await
    }

    /// Join `path` onto the base address with exactly one `/` between them.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_address.clone();
        }
        format!(
            "{}/{}",
            self.base_address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Result<Body, Fault>>,
        cancel: &CancellationToken,
    ) -> OperationResult<T> {
        let url = self.resolve_url(path);
        match self.round_trip(verb, &url, body, cancel).await {
            Ok(response) => self.complete(verb, url, response),
            Err(fault) => self.fault(verb, url, fault),
        }
    }

    async fn round_trip(
        &self,
        verb: Verb,
        url: &str,
        body: Option<Result<Body, Fault>>,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, Fault> {
        Url::parse(url).map_err(|e| Fault::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut headers = self.default_headers.clone();
        if let Some(value) = &self.authorization {
            headers.push((AUTHORIZATION.to_string(), value.clone()));
        }

        // GET and DELETE pass `None` and never carry a body.
        let body = match body.transpose()? {
            None => None,
            Some(Body::Empty) => Some(String::new()),
            Some(body) => {
                headers.push((CONTENT_TYPE.to_string(), JSON_UTF8.to_string()));
                Some(body.into_text())
            }
        };

        let request = HttpRequest {
            verb,
            url: url.to_string(),
            headers,
            body,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Fault::Cancelled),
            result = self.transport.send(request) => Ok(result?),
        }
    }

    fn complete<T: DeserializeOwned>(
        &self,
        verb: Verb,
        url: String,
        response: HttpResponse,
    ) -> OperationResult<T> {
        self.log_response(verb, &url, &response);

        let success = response.is_success();
        let info = CompletedRequest {
            verb,
            url,
            response: response.body,
            response_code: response.status,
        };
        if !success {
            return OperationResult::rejected(info);
        }

        match deserialize_body::<T>(&info.response) {
            Ok(value) => OperationResult::succeeded(value, info),
            Err(e) => self.fault(
                verb,
                info.url,
                Fault::Deserialization {
                    status: info.response_code,
                    body: info.response,
                    message: e.to_string(),
                },
            ),
        }
    }

    fn fault<T>(&self, verb: Verb, url: String, fault: Fault) -> OperationResult<T> {
        self.log_fault(verb, &url, &fault);
        OperationResult::faulted(FaultedRequest { verb, url, fault })
    }

    fn log_response(&self, verb: Verb, url: &str, response: &HttpResponse) {
        debug!(
            "[REQUEST ({verb})] {url}\n[HEADERS] {}\n[RESPONSE {}] {}",
            self.authorization.as_deref().unwrap_or_default(),
            response.status,
            response.body
        );
    }

    fn log_fault(&self, verb: Verb, url: &str, fault: &Fault) {
        warn!(
            "[REQUEST ({verb})] {url}\n[FAILED: {}]\n{fault}",
            fault.source_label()
        );
    }
}

fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| ConfigError::Client(e.to_string()))?;
    Ok(Arc::new(ReqwestTransport::from_client(client)))
}

/// An empty body deserializes as JSON `null`, so `()` and `Option<_>` accept
/// 204-style responses.
fn deserialize_body<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    if body.trim().is_empty() {
        serde_json::from_str("null")
    } else {
        serde_json::from_str(body)
    }
}

fn validate_base_address(address: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidBaseAddress {
        address: address.to_string(),
        message,
    };
    let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not usable as a base URL".to_string()));
    }
    Ok(())
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidHeader {
        name: name.to_string(),
        message,
    };
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}
