//! HTTP transport: authentication, retry, response resolution.
//!
//! A call flows through [`HttpClient`], which builds a [`RequestEnvelope`],
//! hands it to the [`RetryEngine`] (applying the [`Authenticator`] on each
//! attempt) and finally resolves the response into a value or a
//! [`TofuPilotError`](crate::TofuPilotError).

mod auth;
mod client;
mod request;
mod resolver;
mod retry;

pub use auth::{API_KEY_ENV, Authenticator, resolve_credential};
pub use client::HttpClient;
pub use request::{FilePart, JSON_CONTENT_TYPE, RequestBody, RequestEnvelope};
pub use resolver::{error_from_parts, extract_error_code, extract_error_message, resolve};
pub use retry::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRYABLE_STATUS_CODES, FixedJitter, HasStatus, JitterSource, RetryEngine, RetryPolicy,
    ThreadRngJitter,
};

pub(crate) use auth::mask_token;
pub(crate) use retry::cancellable;
