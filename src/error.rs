//! Typed errors returned by every client operation.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = TofuPilotError> = std::result::Result<T, E>;

/// Context carried by every error that originates from an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiError {
    /// Human readable message, taken from the response body when possible.
    pub message: String,
    /// HTTP status code of the failed response.
    pub status: Option<u16>,
    /// Machine readable error code reported by the API, if any.
    pub error_code: Option<String>,
    /// Raw response body.
    pub response_body: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error_code(mut self, code: Option<String>) -> Self {
        self.error_code = code;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Attachment pre-flight failures. Raised before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cannot upload more than {max} attachments per run (got {count}).")]
    TooManyAttachments { count: usize, max: usize },

    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("File {} exceeds maximum size of {}.", .path.display(), size_label(*.max))]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },
}

/// Whole megabytes when the limit is at least 1 MiB, bytes otherwise.
fn size_label(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[derive(Debug, Error)]
pub enum TofuPilotError {
    #[error("{0}")]
    BadRequest(ApiError),

    #[error("{0}")]
    Unauthorized(ApiError),

    #[error("{0}")]
    Forbidden(ApiError),

    #[error("{0}")]
    NotFound(ApiError),

    #[error("{0}")]
    Conflict(ApiError),

    #[error("{0}")]
    UnprocessableEntity(ApiError),

    #[error("{error}")]
    RateLimited {
        error: ApiError,
        retry_after: Option<Duration>,
    },

    #[error("{0}")]
    InternalServerError(ApiError),

    #[error("{0}")]
    ServiceUnavailable(ApiError),

    /// Any other non-success status.
    #[error("{0}")]
    Generic(ApiError),

    /// Connection failures and timeouts that were not caused by the caller.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Failed to deserialize response: {message}")]
    Deserialization {
        message: String,
        response_body: Option<String>,
    },

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl TofuPilotError {
    /// Maps a failed HTTP status onto its typed variant.
    ///
    /// 400, 401, 403, 404, 409, 422, 429, 500 and 503 have dedicated variants;
    /// everything else becomes [`TofuPilotError::Generic`].
    pub fn from_status(status: u16, error: ApiError) -> Self {
        let error = ApiError {
            status: Some(status),
            ..error
        };
        match status {
            400 => Self::BadRequest(error),
            401 => Self::Unauthorized(error),
            403 => Self::Forbidden(error),
            404 => Self::NotFound(error),
            409 => Self::Conflict(error),
            422 => Self::UnprocessableEntity(error),
            429 => Self::RateLimited {
                error,
                retry_after: None,
            },
            500 => Self::InternalServerError(error),
            503 => Self::ServiceUnavailable(error),
            _ => Self::Generic(error),
        }
    }

    pub(crate) fn network(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {}", error)
        } else {
            error.to_string()
        };
        Self::Network {
            message,
            source: Some(error),
        }
    }

    pub(crate) fn deserialization(message: impl Into<String>, body: Option<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
            response_body: body,
        }
    }

    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::BadRequest(e)
            | Self::Unauthorized(e)
            | Self::Forbidden(e)
            | Self::NotFound(e)
            | Self::Conflict(e)
            | Self::UnprocessableEntity(e)
            | Self::InternalServerError(e)
            | Self::ServiceUnavailable(e)
            | Self::Generic(e) => Some(e),
            Self::RateLimited { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of the response that produced this error.
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(|e| e.status)
    }

    /// API error code, if the server reported one.
    pub fn error_code(&self) -> Option<&str> {
        self.api_error().and_then(|e| e.error_code.as_deref())
    }

    /// Raw body of the failed response.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Deserialization { response_body, .. } => response_body.as_deref(),
            other => other.api_error().and_then(|e| e.response_body.as_deref()),
        }
    }

    /// Message without the variant prefix.
    pub fn message(&self) -> String {
        match self.api_error() {
            Some(e) => e.message.clone(),
            None => self.to_string(),
        }
    }

    /// Server-provided wait hint for rate limited requests.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::RateLimited { .. }
                | Self::InternalServerError(_)
                | Self::ServiceUnavailable(_)
        ) || matches!(self.status(), Some(502 | 504))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_table() {
        let cases: [(u16, fn(&TofuPilotError) -> bool); 10] = [
            (400, |e| matches!(e, TofuPilotError::BadRequest(_))),
            (401, |e| matches!(e, TofuPilotError::Unauthorized(_))),
            (403, |e| matches!(e, TofuPilotError::Forbidden(_))),
            (404, |e| matches!(e, TofuPilotError::NotFound(_))),
            (409, |e| matches!(e, TofuPilotError::Conflict(_))),
            (422, |e| matches!(e, TofuPilotError::UnprocessableEntity(_))),
            (429, |e| matches!(e, TofuPilotError::RateLimited { .. })),
            (500, |e| matches!(e, TofuPilotError::InternalServerError(_))),
            (503, |e| matches!(e, TofuPilotError::ServiceUnavailable(_))),
            (418, |e| matches!(e, TofuPilotError::Generic(_))),
        ];

        for (status, check) in cases {
            let err = TofuPilotError::from_status(status, ApiError::new("boom"));
            assert!(check(&err), "status {} mapped to {:?}", status, err);
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_error_carries_context() {
        let err = TofuPilotError::from_status(
            409,
            ApiError::new("Duplicate serial number")
                .with_error_code(Some("DUPLICATE".to_string()))
                .with_body(r#"{"message":"Duplicate serial number","code":"DUPLICATE"}"#),
        );

        assert_eq!(err.to_string(), "Duplicate serial number");
        assert_eq!(err.message(), "Duplicate serial number");
        assert_eq!(err.error_code(), Some("DUPLICATE"));
        assert!(err.response_body().unwrap().contains("DUPLICATE"));
    }

    #[test]
    fn test_generic_keeps_unmapped_status() {
        let err = TofuPilotError::from_status(502, ApiError::new("API error: 502"));
        assert!(matches!(err, TofuPilotError::Generic(_)));
        assert_eq!(err.status(), Some(502));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            TofuPilotError::Network {
                message: "connection reset".to_string(),
                source: None,
            }
            .is_retryable()
        );
        assert!(TofuPilotError::from_status(503, ApiError::new("down")).is_retryable());
        assert!(!TofuPilotError::from_status(404, ApiError::new("gone")).is_retryable());
        assert!(!TofuPilotError::Cancelled.is_retryable());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooManyAttachments { count: 25, max: 20 };
        assert!(err.to_string().contains("more than 20"));

        let err = ValidationError::FileTooLarge {
            path: PathBuf::from("report.bin"),
            size: 60 * 1024 * 1024,
            max: 50 * 1024 * 1024,
        };
        assert!(err.to_string().contains("50 MB"));
        assert!(err.to_string().contains("report.bin"));

        let err: TofuPilotError = ValidationError::FileMissing(PathBuf::from("missing.txt")).into();
        assert!(err.to_string().contains("missing.txt"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_small_size_limit_shown_in_bytes() {
        let err = ValidationError::FileTooLarge {
            path: PathBuf::from("trace.csv"),
            size: 2048,
            max: 1024,
        };
        assert_eq!(
            err.to_string(),
            "File trace.csv exceeds maximum size of 1024 bytes."
        );
    }
}
