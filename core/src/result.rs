//! Normalized outcome of one request.
//!
//! # Design
//! `RequestInfo` is a sum type so callers match exhaustively on whether an
//! HTTP response arrived (`Completed`) or not (`Faulted`). `OperationResult`
//! keeps its fields private; the constructors below are the only way to build
//! one, which upholds "response present iff success".

use crate::error::Fault;
use crate::http::Verb;

/// Metadata about a request that received an HTTP response, any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRequest {
    pub verb: Verb,
    pub url: String,
    /// Raw response body text.
    pub response: String,
    pub response_code: u16,
}

/// Metadata about a request that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultedRequest {
    pub verb: Verb,
    pub url: String,
    pub fault: Fault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestInfo {
    Completed(CompletedRequest),
    Faulted(FaultedRequest),
}

impl RequestInfo {
    pub fn verb(&self) -> Verb {
        match self {
            RequestInfo::Completed(c) => c.verb,
            RequestInfo::Faulted(f) => f.verb,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            RequestInfo::Completed(c) => &c.url,
            RequestInfo::Faulted(f) => &f.url,
        }
    }

    pub fn as_completed(&self) -> Option<&CompletedRequest> {
        match self {
            RequestInfo::Completed(c) => Some(c),
            RequestInfo::Faulted(_) => None,
        }
    }

    pub fn as_faulted(&self) -> Option<&FaultedRequest> {
        match self {
            RequestInfo::Completed(_) => None,
            RequestInfo::Faulted(f) => Some(f),
        }
    }
}

/// Outcome of one executor call. Never an error: inspect `is_success` and
/// `request_info` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<T> {
    is_success: bool,
    response: Option<T>,
    request_info: RequestInfo,
}

impl<T> OperationResult<T> {
    /// 2xx response whose body deserialized into `T`.
    pub(crate) fn succeeded(response: T, info: CompletedRequest) -> Self {
        Self {
            is_success: true,
            response: Some(response),
            request_info: RequestInfo::Completed(info),
        }
    }

    /// Response received with a non-2xx status.
    pub(crate) fn rejected(info: CompletedRequest) -> Self {
        Self {
            is_success: false,
            response: None,
            request_info: RequestInfo::Completed(info),
        }
    }

    pub(crate) fn faulted(info: FaultedRequest) -> Self {
        Self {
            is_success: false,
            response: None,
            request_info: RequestInfo::Faulted(info),
        }
    }

    pub fn is_success(&self) -> bool {
        self.is_success
    }

    pub fn response(&self) -> Option<&T> {
        self.response.as_ref()
    }

    pub fn request_info(&self) -> &RequestInfo {
        &self.request_info
    }

    pub fn into_response(self) -> Option<T> {
        self.response
    }

    /// The typed response on success, otherwise the request info that
    /// explains the failure.
    pub fn into_result(self) -> Result<T, RequestInfo> {
        match self.response {
            Some(response) => Ok(response),
            None => Err(self.request_info),
        }
    }
}
