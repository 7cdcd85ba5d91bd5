//! Bearer credential injection.

use std::fmt;
use std::sync::Arc;

use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{Result, TofuPilotError};
use crate::runtime::Runtime;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "TOFUPILOT_API_KEY";

/// Resolves the credential for one request.
///
/// A non-empty configured key wins; otherwise `TOFUPILOT_API_KEY` is read
/// from the environment. Returns `None` when neither is available.
pub fn resolve_credential(configured: Option<&str>, runtime: &dyn Runtime) -> Option<String> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    runtime.env_var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

/// Shortens a token for logs: `tp_a*********wxyz`.
pub(crate) fn mask_token(token: &str) -> String {
    match (token.get(..4), token.get(token.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if token.len() > 12 => format!("{}*********{}", head, tail),
        _ => "*********".to_string(),
    }
}

/// Adds `Authorization: Bearer <key>` to outgoing requests.
///
/// Holds no resolved token; the key is looked up again on every call so a
/// rotated environment variable is picked up without rebuilding the client.
#[derive(Clone)]
pub struct Authenticator {
    api_key: Option<String>,
    runtime: Arc<dyn Runtime>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("api_key", &self.api_key.as_deref().map(mask_token))
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(api_key: Option<String>, runtime: Arc<dyn Runtime>) -> Self {
        Self { api_key, runtime }
    }

    /// Inserts the authorization header if a credential resolves.
    ///
    /// Returns whether a header was added. Requests without a credential are
    /// passed through untouched and left for the server to reject.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<bool> {
        let Some(token) = resolve_credential(self.api_key.as_deref(), self.runtime.as_ref()) else {
            debug!("No API key available, sending unauthenticated request");
            return Ok(false);
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            TofuPilotError::Configuration("API key contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        debug!("Using API key for authentication: {}", mask_token(&token));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::env::VarError;

    fn runtime_with_env(value: Option<&'static str>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(API_KEY_ENV))
            .returning(move |_| value.map(str::to_string).ok_or(VarError::NotPresent));
        runtime
    }

    #[test]
    fn test_configured_key_takes_precedence() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();

        let key = resolve_credential(Some("configured"), &runtime);
        assert_eq!(key.as_deref(), Some("configured"));
    }

    #[test]
    fn test_empty_configured_key_falls_back_to_env() {
        let runtime = runtime_with_env(Some("from-env"));
        assert_eq!(
            resolve_credential(Some(""), &runtime).as_deref(),
            Some("from-env")
        );
        assert_eq!(resolve_credential(None, &runtime).as_deref(), Some("from-env"));
    }

    #[test]
    fn test_no_credential_anywhere() {
        let runtime = runtime_with_env(None);
        assert_eq!(resolve_credential(None, &runtime), None);
    }

    #[test]
    fn test_apply_sets_sensitive_bearer_header() {
        let auth = Authenticator::new(Some("tp_secret_key_123".to_string()), Arc::new(MockRuntime::new()));
        let mut headers = HeaderMap::new();

        assert!(auth.apply(&mut headers).unwrap());
        let value = &headers[AUTHORIZATION];
        assert_eq!(value, "Bearer tp_secret_key_123");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_apply_without_credential_leaves_headers_untouched() {
        let auth = Authenticator::new(None, Arc::new(runtime_with_env(None)));
        let mut headers = HeaderMap::new();

        assert!(!auth.apply(&mut headers).unwrap());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_env_is_read_on_every_apply() {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();
        runtime
            .expect_env_var()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("first-key".to_string()));
        runtime
            .expect_env_var()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("rotated-key".to_string()));
        let auth = Authenticator::new(None, Arc::new(runtime));

        let mut headers = HeaderMap::new();
        auth.apply(&mut headers).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer first-key");

        auth.apply(&mut headers).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer rotated-key");
    }

    #[test]
    fn test_invalid_key_is_configuration_error() {
        let auth = Authenticator::new(Some("bad\nkey".to_string()), Arc::new(MockRuntime::new()));
        let err = auth.apply(&mut HeaderMap::new()).unwrap_err();
        assert!(matches!(err, TofuPilotError::Configuration(_)));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("tp_abcdefghijklmnop"), "tp_a*********mnop");
        assert_eq!(mask_token("short"), "*********");
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let auth = Authenticator::new(
            Some("tp_abcdefghijklmnop".to_string()),
            Arc::new(MockRuntime::new()),
        );
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("abcdefghijkl"));
    }
}
