//! Client configuration and environment overrides.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Result, TofuPilotError};
use crate::http::{RetryPolicy, mask_token};
use crate::runtime::Runtime;
use crate::upload::AttachmentLimits;

pub const DEFAULT_BASE_URL: &str = "https://www.tofupilot.com";

/// Environment variable consulted when no base URL is configured.
pub const URL_ENV: &str = "TOFUPILOT_URL";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build a [`TofuPilotClient`](crate::TofuPilotClient).
///
/// Unset `api_key` and `base_url` fall back to `TOFUPILOT_API_KEY` and
/// `TOFUPILOT_URL`.
#[derive(Clone, PartialEq)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Per-attempt timeout applied by an owned transport.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub limits: AttachmentLimits,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            limits: AttachmentLimits::default(),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &self.api_key.as_deref().map(mask_token))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("limits", &self.limits)
            .finish()
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_limits(mut self, limits: AttachmentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Picks the base URL: configured value, then `TOFUPILOT_URL`, then the default.
    pub fn resolve_base_url(&self, runtime: &dyn Runtime) -> Result<Url> {
        let raw = self
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| runtime.env_var(URL_ENV).ok().filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let url = Url::parse(raw.trim())
            .map_err(|e| TofuPilotError::Configuration(format!("invalid base URL '{}': {}", raw, e)))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(TofuPilotError::Configuration(format!(
                "base URL must be an http(s) URL, got '{}'",
                raw
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.retry.enabled);
        assert_eq!(options.limits.max_attachments, 20);
        assert_eq!(options.limits.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();

        let options = ClientOptions::new().with_base_url("http://localhost:3000");
        let url = options.resolve_base_url(&runtime).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_base_url_from_env() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(URL_ENV))
            .returning(|_| Ok("https://tofupilot.example.com".to_string()));

        let url = ClientOptions::new().resolve_base_url(&runtime).unwrap();
        assert_eq!(url.host_str(), Some("tofupilot.example.com"));
    }

    #[test]
    fn test_base_url_default() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(URL_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));

        let url = ClientOptions::new().resolve_base_url(&runtime).unwrap();
        assert_eq!(url.as_str(), "https://www.tofupilot.com/");
    }

    #[test]
    fn test_invalid_base_url() {
        let runtime = MockRuntime::new();
        for bad in ["not a url", "ftp://example.com", "mailto:ops@example.com"] {
            let err = ClientOptions::new()
                .with_base_url(bad)
                .resolve_base_url(&runtime)
                .unwrap_err();
            assert!(matches!(err, TofuPilotError::Configuration(_)), "{}", bad);
        }
    }

    #[test]
    fn test_debug_masks_api_key() {
        let options = ClientOptions::new().with_api_key("tp_live_0123456789abcdef");
        let rendered = format!("{:?}", options);
        assert!(!rendered.contains("0123456789"));
        assert!(rendered.contains("tp_l*********cdef"));
    }
}
