//! Error types for the request executor.
//!
//! # Design
//! Only `ConfigError` and `UnsupportedVerb` are ever returned as `Err`. A
//! failed request is never an `Err`: it becomes a `Fault` stored inside the
//! `Faulted` request info of an `OperationResult`. Non-2xx responses are not
//! faults at all; they complete normally with `is_success == false`.
//!
//! Variants carry owned strings rather than the underlying library errors so
//! results stay `Clone` and comparable in tests.

use thiserror::Error;

/// Why a request produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Base address and path did not join into a valid URL.
    #[error("invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before a full response was read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The caller's cancellation token fired before the response was read.
    #[error("request cancelled")]
    Cancelled,

    /// A 2xx response arrived but its body did not match the expected type.
    /// Status and body are kept so the caller can still inspect them.
    #[error("response deserialization failed (HTTP {status}): {message}")]
    Deserialization {
        status: u16,
        body: String,
        message: String,
    },
}

impl Fault {
    /// Short name of the failing stage, used in diagnostic logs.
    pub fn source_label(&self) -> &'static str {
        match self {
            Fault::InvalidUrl { .. } => "url",
            Fault::Serialization(_) => "serialization",
            Fault::Transport(_) => "transport",
            Fault::Cancelled => "cancellation",
            Fault::Deserialization { .. } => "deserialization",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Fault::Cancelled)
    }
}

/// Errors raised by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("reading response body failed: {0}")]
    Body(String),
}

/// Errors raised while initializing a `RequestExecutor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid base address {address}: {message}")]
    InvalidBaseAddress { address: String, message: String },

    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A verb outside GET, POST, PUT and DELETE.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP verb: {0}")]
pub struct UnsupportedVerb(pub String);
