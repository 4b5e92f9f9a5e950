//! Single synchronous requests.
//!
//! [`HttpClient`] is an explicitly configured blocking client.
//! [`LazyClient`] wraps one that is created on first use from the options of
//! that first call and reused afterwards.

pub mod core;
pub mod lazy;

pub use self::core::HttpClient;
pub use self::lazy::LazyClient;
