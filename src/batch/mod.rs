//! 批量请求模块：并发发送一组请求，并按提交顺序收集结果。
//!
//! # Batch Request Module
//!
//! Sends one request per parameter set of a [`BatchJob`](crate::BatchJob)
//! concurrently and returns a [`BatchResult`] whose entry `i` always belongs
//! to parameter set `i`, whatever order the responses arrive in.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchDispatcher`] | Owns an async client and dispatches jobs |
//! | [`BatchOptions`] | Concurrency bound (defaults to the batch length) |
//! | [`BatchEntry`] | `{code, content}` outcome of one request |
//! | [`BatchResult`] | Index-aligned entries plus execution time |
//! | [`batch_request`] | Blocking entry point with a fresh client per call |
//!
//! ## Example
//!
//! ```rust,no_run
//! use batch_http::{batch_request, BatchJob, BatchTemplate, ContentType};
//! use serde_json::json;
//!
//! let job = BatchJob::new(
//!     BatchTemplate::new("POST", "http://localhost:8080/items")
//!         .with_content_type(ContentType::Json),
//! )
//! .with_params_list(vec![
//!     json!({"id": 1}).as_object().cloned().unwrap(),
//!     json!({"id": 2}).as_object().cloned().unwrap(),
//! ]);
//!
//! let result = batch_request(&job, None)?;
//! for entry in &result {
//!     println!("{} {}", entry.code, entry.content);
//! }
//! # Ok::<(), batch_http::Error>(())
//! ```
//!
//! ## Failures
//!
//! A failing request never aborts its siblings. Its entry carries the HTTP
//! status (4xx/5xx) or a negative [`FailureKind`](crate::failure::FailureKind)
//! code, and the error message as content.

mod dispatcher;
mod result;

pub use dispatcher::{batch_request, batch_request_with, BatchDispatcher, BatchOptions};
pub use result::{BatchEntry, BatchResult};
