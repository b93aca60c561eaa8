//! Asynchronous HTTP request executor with normalized results.
//!
//! # Overview
//! `RequestExecutor` issues GET, POST, PUT and DELETE requests against a
//! base address and turns every outcome into an `OperationResult<T>`: a
//! success flag, the typed response on success, and a `RequestInfo` saying
//! whether an HTTP response arrived (`Completed`) or not (`Faulted`). The
//! four operations never return `Err` and never panic on I/O failures.
//!
//! # Design
//! - The network sits behind the `Transport` trait. `ReqwestTransport` is the
//!   default; tests and hosts inject their own.
//! - Requests and responses cross that seam as plain data (`HttpRequest`,
//!   `HttpResponse`), keeping the executor's logic deterministic.
//! - Cancellation is a `tokio_util::sync::CancellationToken` raced against
//!   the transport; a cancelled call resolves as `Fault::Cancelled`.
//! - `&str`/`String` payloads are sent verbatim; `Payload::json` serializes
//!   any `Serialize` value.
//!
//! ```no_run
//! use request_core::{CancellationToken, RequestExecutor};
//!
//! #[derive(serde::Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn demo() -> Result<(), request_core::ConfigError> {
//! let executor = RequestExecutor::initialize("https://api.example.com/", None)?;
//! let result = executor.get::<User>("users/1", &CancellationToken::new()).await;
//! if let Some(user) = result.response() {
//!     println!("{} {}", user.id, user.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod payload;
pub mod result;
pub mod transport;

pub use config::ExecutorConfig;
pub use error::{ConfigError, Fault, TransportError, UnsupportedVerb};
pub use executor::RequestExecutor;
pub use http::{HttpRequest, HttpResponse, Verb};
pub use payload::{Body, Payload};
pub use result::{CompletedRequest, FaultedRequest, OperationResult, RequestInfo};
pub use transport::{ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
