//! `apiclient` is a small async HTTP client wrapper.
//!
//! Requests are sent against a fixed base URL with:
//! - a JSON-encoded optional body,
//! - caller headers replacing the defaults,
//! - a bounded number of retries with a fixed delay,
//! - optional request/response dumps through a [`DebugSink`].
//!
//! The entry point is [`ApiClient::send_request`].

mod client;
mod debug;
mod error;
mod options;
mod types;

pub use client::ApiClient;
pub use debug::{DebugSink, TracingSink};
pub use error::ApiClientError;
pub use options::{ClientConfig, DEFAULT_TIMEOUT};
pub use types::{ApiRequest, ApiResponse};

pub type Result<T> = std::result::Result<T, ApiClientError>;
