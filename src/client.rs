//! The `TofuPilotClient` facade.
//!
//! Builds one [`HttpClient`] from [`ClientOptions`] and hands a clone of it to
//! every resource binding, so all resources share auth, retry policy and the
//! underlying connection pool.

use std::sync::Arc;

use log::debug;
use reqwest::Client;

use crate::config::ClientOptions;
use crate::error::{Result, TofuPilotError};
use crate::http::{Authenticator, HttpClient, RetryEngine};
use crate::resources::{
    AttachmentsResource, BatchesResource, PartsResource, ProceduresResource, RunsResource,
    StationsResource, UnitsResource,
};
use crate::runtime::{RealRuntime, Runtime};
use crate::upload::AttachmentUploader;

pub const USER_AGENT: &str = concat!("tofupilot-rust/", env!("TOFUPILOT_VERSION"));

/// Who is responsible for the underlying `reqwest::Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOwnership {
    /// Built by the facade and dropped with it.
    Owned,
    /// Supplied by the caller and left alone on close.
    Shared,
}

#[derive(Debug, Clone)]
pub struct TofuPilotClient {
    http: HttpClient,
    ownership: TransportOwnership,
    runs: RunsResource,
    units: UnitsResource,
    parts: PartsResource,
    batches: BatchesResource,
    procedures: ProceduresResource,
    stations: StationsResource,
    attachments: AttachmentsResource,
}

impl TofuPilotClient {
    /// Builds a client that owns its transport.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_runtime(options, Arc::new(RealRuntime))
    }

    /// Default options; the API key and URL come from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    pub fn with_runtime(options: ClientOptions, runtime: Arc<dyn Runtime>) -> Result<Self> {
        let transport = build_transport(&options)?;
        Self::assemble(transport, TransportOwnership::Owned, options, runtime)
    }

    /// Reuses a caller-supplied transport.
    ///
    /// `options.timeout` is not applied; the supplied client's own settings
    /// are used as-is.
    pub fn with_transport(client: Client, options: ClientOptions) -> Result<Self> {
        Self::assemble(
            client,
            TransportOwnership::Shared,
            options,
            Arc::new(RealRuntime),
        )
    }

    fn assemble(
        transport: Client,
        ownership: TransportOwnership,
        options: ClientOptions,
        runtime: Arc<dyn Runtime>,
    ) -> Result<Self> {
        let base_url = options.resolve_base_url(runtime.as_ref())?;
        debug!(
            "Creating TofuPilot client for {} ({:?} transport)",
            base_url, ownership
        );

        let auth = Authenticator::new(options.api_key.clone(), Arc::clone(&runtime));
        let retry = RetryEngine::new(options.retry.clone());
        let http = HttpClient::new(transport, base_url, auth, retry);
        let uploader = AttachmentUploader::new(http.clone(), runtime, options.limits);

        Ok(Self {
            runs: RunsResource::new(http.clone()),
            units: UnitsResource::new(http.clone()),
            parts: PartsResource::new(http.clone()),
            batches: BatchesResource::new(http.clone()),
            procedures: ProceduresResource::new(http.clone()),
            stations: StationsResource::new(http.clone()),
            attachments: AttachmentsResource::new(http.clone(), uploader),
            http,
            ownership,
        })
    }

    pub fn runs(&self) -> &RunsResource {
        &self.runs
    }

    pub fn units(&self) -> &UnitsResource {
        &self.units
    }

    pub fn parts(&self) -> &PartsResource {
        &self.parts
    }

    pub fn batches(&self) -> &BatchesResource {
        &self.batches
    }

    pub fn procedures(&self) -> &ProceduresResource {
        &self.procedures
    }

    pub fn stations(&self) -> &StationsResource {
        &self.stations
    }

    pub fn attachments(&self) -> &AttachmentsResource {
        &self.attachments
    }

    /// The shared transport, for endpoints without a typed binding.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn ownership(&self) -> TransportOwnership {
        self.ownership
    }

    pub fn owns_transport(&self) -> bool {
        self.ownership == TransportOwnership::Owned
    }

    /// Consumes the facade and drops its handle on the transport.
    ///
    /// Nothing is torn down explicitly: `reqwest::Client` closes its pooled
    /// connections when its last clone is dropped. For an owned transport
    /// that happens here, unless an [`HttpClient`] obtained from
    /// [`http`](Self::http) was cloned and is still alive. A shared transport
    /// stays open as long as the caller holds it.
    pub fn close(self) {
        match self.ownership {
            TransportOwnership::Owned => debug!("Dropping owned transport"),
            TransportOwnership::Shared => debug!("Leaving shared transport open"),
        }
    }
}

fn build_transport(options: &ClientOptions) -> Result<Client> {
    Client::builder()
        .timeout(options.timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TofuPilotError::Configuration(format!("failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use crate::runtime::MockRuntime;
    use mockito::{Matcher, Server};
    use std::env::VarError;
    use tokio_util::sync::CancellationToken;

    fn mock_runtime(url: Option<String>, key: Option<&'static str>) -> Arc<dyn Runtime> {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .withf(|name| name == "TOFUPILOT_URL")
            .returning(move |_| url.clone().ok_or(VarError::NotPresent));
        runtime
            .expect_env_var()
            .withf(|name| name == "TOFUPILOT_API_KEY")
            .returning(move |_| key.map(String::from).ok_or(VarError::NotPresent));
        Arc::new(runtime)
    }

    #[test]
    fn test_new_owns_transport() {
        let options = ClientOptions::new()
            .with_api_key("tp_test")
            .with_base_url("https://example.com");
        let client = TofuPilotClient::new(options).unwrap();
        assert_eq!(client.ownership(), TransportOwnership::Owned);
        assert!(client.owns_transport());
        assert_eq!(client.http().base_url().as_str(), "https://example.com/");
        client.close();
    }

    #[test]
    fn test_with_transport_is_shared() {
        let shared = Client::new();
        let options = ClientOptions::new().with_base_url("https://example.com");
        let client = TofuPilotClient::with_transport(shared.clone(), options).unwrap();
        assert_eq!(client.ownership(), TransportOwnership::Shared);
        assert!(!client.owns_transport());
        client.close();

        // The caller's transport is still usable after close.
        let _request = shared.get("https://example.com").build().unwrap();
    }

    #[test]
    fn test_base_url_from_environment() {
        let runtime = mock_runtime(Some("https://staging.example.com".into()), None);
        let client = TofuPilotClient::with_runtime(ClientOptions::default(), runtime).unwrap();
        assert_eq!(
            client.http().base_url().as_str(),
            "https://staging.example.com/"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let options = ClientOptions::new().with_base_url("ftp://example.com");
        let err = TofuPilotClient::new(options).unwrap_err();
        assert!(matches!(err, TofuPilotError::Configuration(_)));
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("tofupilot-rust/"));
        assert!(USER_AGENT.len() > "tofupilot-rust/".len());
    }

    #[tokio::test]
    async fn test_resources_share_auth_and_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/units/u1")
            .match_header("authorization", "Bearer tp_env_key")
            .match_header("user-agent", Matcher::Regex("^tofupilot-rust/".into()))
            .with_status(200)
            .with_body(r#"{"id":"u1","serialNumber":"SN-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let runtime = mock_runtime(Some(server.url()), Some("tp_env_key"));
        let options = ClientOptions::new().with_retry(RetryPolicy::disabled());
        let client = TofuPilotClient::with_runtime(options, runtime).unwrap();

        let unit = client
            .units()
            .get("u1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(unit.id, "u1");
        mock.assert_async().await;
    }
}
