//! # batch-http
//!
//! A thin helper layer over `reqwest` for issuing HTTP requests: single
//! synchronous requests, and batches of requests dispatched concurrently with
//! their outcomes collected in submission order.
//!
//! ## Overview
//!
//! - **Request encoding**: `GET` parameters go into the query string; other
//!   methods send a JSON body (`type = json`) or a form body (anything else).
//! - **Single requests**: [`HttpClient`] returns the response body, or a
//!   structured [`Error`]. [`LazyClient`] builds its client on first use and
//!   reuses it, collapsing failures to `None`.
//! - **Batches**: [`batch_request`] / [`BatchDispatcher`] send every parameter
//!   set of a [`BatchJob`] concurrently and return a [`BatchResult`] where
//!   entry `i` is `{code, content}` for parameter set `i`.
//!
//! Defaults: TLS verification **disabled**, 2 second timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_http::{HttpClient, RequestSpec};
//!
//! fn main() -> batch_http::Result<()> {
//!     let client = HttpClient::with_defaults()?;
//!     let body = client.execute(&RequestSpec::get("http://localhost:8080/search").with_param("q", "test"))?;
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`encode`] | Parameter → query / JSON / form payload |
//! | [`request`] | Request, batch template and batch job descriptions |
//! | [`client`] | Blocking single-request clients |
//! | [`batch`] | Concurrent batch dispatch and results |
//! | [`config`] | Client configuration and option merging |
//! | [`transport`] | reqwest client construction and execution |
//! | [`failure`] | Failure classification and integer codes |

pub mod batch;
pub mod client;
pub mod config;
pub mod encode;
pub mod failure;
pub mod request;
pub mod transport;

pub use batch::{batch_request, batch_request_with, BatchDispatcher, BatchEntry, BatchOptions, BatchResult};
pub use client::{HttpClient, LazyClient};
pub use config::{ClientConfig, ClientOptions};
pub use encode::{encode, ContentType, Params, TransportPayload};
pub use failure::FailureKind;
pub use request::{BatchJob, BatchTemplate, RequestSpec};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
