//! Turns completed responses into typed values or typed errors.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, Result, TofuPilotError};

use super::retry::cancellable;

/// Pulls a human readable message out of an error body.
///
/// Looks at `message`, then `error` when it is a string, then
/// `error.message`. Anything else, including bodies that are not JSON,
/// yields `None`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    match json.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

/// Machine readable code from `code` or `error.code`.
pub fn extract_error_code(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("code")
        .and_then(Value::as_str)
        .or_else(|| json.get("error")?.get("code")?.as_str())
        .map(str::to_string)
}

/// `Retry-After` expressed in whole seconds. HTTP dates are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Builds the typed error for a non-success response.
pub fn error_from_parts(status: StatusCode, headers: &HeaderMap, body: String) -> TofuPilotError {
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
    let error = ApiError::new(message)
        .with_error_code(extract_error_code(&body))
        .with_body(body);

    match TofuPilotError::from_status(status.as_u16(), error) {
        TofuPilotError::RateLimited { error, .. } => TofuPilotError::RateLimited {
            error,
            retry_after: parse_retry_after(headers),
        },
        other => other,
    }
}

/// Reads the whole body, honouring cancellation.
pub(crate) async fn read_body(
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<String> {
    cancellable(cancel, async {
        response.text().await.map_err(TofuPilotError::network)
    })
    .await
}

/// Resolves a response into `T`, or into the error matching its status.
///
/// A 2xx body that is empty or `null` is a deserialization failure.
pub async fn resolve<T: DeserializeOwned>(
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<T> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = read_body(response, cancel).await?;

    if !status.is_success() {
        debug!("Request failed with status {}", status);
        return Err(error_from_parts(status, &headers, body));
    }

    deserialize_body(&body)
}

pub(crate) fn deserialize_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Err(TofuPilotError::deserialization(
            "empty response body",
            Some(body.to_string()),
        ));
    }

    match serde_json::from_str::<Option<T>>(body) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(TofuPilotError::deserialization(
            "response body was null",
            Some(body.to_string()),
        )),
        Err(e) => Err(TofuPilotError::deserialization(
            e.to_string(),
            Some(body.to_string()),
        )),
    }
}
