//! Request body encoding for POST and PUT.
//!
//! Callers say what a payload is: `&str` and `String` convert into verbatim
//! text, so pre-rendered JSON goes out untouched; `Payload::json` serializes
//! any `Serialize` value with `serde_json`, including values that serialize
//! as JSON strings (unit enum variants, newtypes, ids, timestamps).

use serde::Serialize;

use crate::error::Fault;

/// Encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// No payload. Sent as an empty body without a content type.
    Empty,
    /// A non-empty string payload, sent verbatim.
    Text(String),
    /// JSON text produced by serializing a payload value.
    Json(String),
}

impl Body {
    pub fn into_text(self) -> String {
        match self {
            Body::Empty => String::new(),
            Body::Text(text) | Body::Json(text) => text,
        }
    }
}

/// Payload handed to `post` and `put`.
///
/// A serialization failure is kept here and surfaces as a `Faulted` result
/// once the request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Result<Body, Fault>);

impl Payload {
    /// No body.
    pub fn none() -> Self {
        Payload(Ok(Body::Empty))
    }

    /// Text sent as-is. Empty text means no body.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::none()
        } else {
            Payload(Ok(Body::Text(text)))
        }
    }

    /// Serialize `value` to JSON. A value that serializes to `null`
    /// (`None`, `()`) means no body.
    pub fn json<P: Serialize + ?Sized>(value: &P) -> Self {
        let encoded = serde_json::to_string(value)
            .map_err(|e| Fault::Serialization(e.to_string()))
            .map(|json| if json == "null" { Body::Empty } else { Body::Json(json) });
        Payload(encoded)
    }

    pub fn into_body(self) -> Result<Body, Fault> {
        self.0
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::text(text)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::text(text)
    }
}

impl From<&String> for Payload {
    fn from(text: &String) -> Self {
        Payload::text(text.as_str())
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::none()
    }
}

impl<S: Into<Payload>> From<Option<S>> for Payload {
    fn from(payload: Option<S>) -> Self {
        payload.map_or_else(Payload::none, Into::into)
    }
}
