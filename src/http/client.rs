//! Verb-oriented JSON client with authentication and retry built in.

use bytes::Bytes;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Result, TofuPilotError};

use super::auth::Authenticator;
use super::request::{FilePart, RequestEnvelope};
use super::resolver::{error_from_parts, read_body, resolve};
use super::retry::{RetryEngine, cancellable};

/// Form field used for multipart uploads.
const FILE_FIELD: &str = "file";

/// HTTP client shared by every resource binding.
///
/// Cheap to clone. Configuration is fixed at construction, so concurrent
/// calls share nothing mutable.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    auth: Authenticator,
    retry: RetryEngine,
}

impl HttpClient {
    pub fn new(client: Client, base_url: Url, auth: Authenticator, retry: RetryEngine) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
            auth,
            retry,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `uri` against the base URL. Absolute URLs are used as is.
    pub fn url(&self, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(uri.trim_start_matches('/'))
                .map_err(|e| TofuPilotError::Configuration(format!("invalid URI '{}': {}", uri, e))),
            Err(e) => Err(TofuPilotError::Configuration(format!(
                "invalid URI '{}': {}",
                uri, e
            ))),
        }
    }

    /// Builds a URL below the base URL from raw path segments.
    ///
    /// Each segment is percent-encoded, so identifiers may contain `/`, `?`
    /// or spaces.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TofuPilotError::Configuration(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get<T: DeserializeOwned>(&self, uri: &str, cancel: &CancellationToken) -> Result<T> {
        let envelope = RequestEnvelope::new(Method::GET, self.url(uri)?);
        self.request(&envelope, cancel).await
    }

    /// POSTs `body` as JSON and deserializes the JSON response.
    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn post<B, T>(&self, uri: &str, body: &B, cancel: &CancellationToken) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = RequestEnvelope::new(Method::POST, self.url(uri)?).json(body)?;
        self.request(&envelope, cancel).await
    }

    /// PATCHes `body` as JSON and deserializes the JSON response.
    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn patch<B, T>(&self, uri: &str, body: &B, cancel: &CancellationToken) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = RequestEnvelope::new(Method::PATCH, self.url(uri)?).json(body)?;
        self.request(&envelope, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let envelope = RequestEnvelope::new(Method::DELETE, self.url(uri)?);
        self.request(&envelope, cancel).await
    }

    /// Uploads one file as a multipart form.
    ///
    /// The reader is drained into memory before the first attempt so that
    /// retries resend the same bytes.
    #[tracing::instrument(skip(self, reader, cancel))]
    pub async fn upload_file<T, R>(
        &self,
        uri: &str,
        mut reader: R,
        file_name: &str,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        R: AsyncRead + Unpin + Send,
    {
        let mut content = Vec::new();
        cancellable(cancel, async {
            reader
                .read_to_end(&mut content)
                .await
                .map_err(|source| TofuPilotError::Io {
                    context: format!("reading {}", file_name),
                    source,
                })
        })
        .await?;
        debug!("Uploading {} ({} bytes)", file_name, content.len());

        let envelope = RequestEnvelope::new(Method::POST, self.url(uri)?).multipart(FilePart {
            field_name: FILE_FIELD.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            content: Bytes::from(content),
        });
        self.request(&envelope, cancel).await
    }

    /// PUTs raw bytes to a presigned storage URL.
    ///
    /// Goes straight to the transport: no credential is attached and a
    /// failure is not retried. The URL's query carries the storage signature,
    /// so only the part before it is recorded on the span.
    #[tracing::instrument(
        skip(self, url, content, cancel),
        fields(destination = without_query(url), size = content.len())
    )]
    pub async fn put_presigned(
        &self,
        url: &str,
        content: Bytes,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(content);

        let response = cancellable(cancel, async {
            request.send().await.map_err(TofuPilotError::network)
        })
        .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Presigned upload finished with status {}", status);
            return Ok(());
        }

        let headers = response.headers().clone();
        let body = read_body(response, cancel).await?;
        Err(error_from_parts(status, &headers, body))
    }

    /// Sends `envelope` through the retry engine and resolves the response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.send(envelope, cancel).await?;
        resolve(response, cancel).await
    }

    /// Sends `envelope` with retries, returning the final raw response.
    ///
    /// Every attempt builds a new request from the buffered envelope and
    /// resolves the credential again.
    pub async fn send(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let operation = format!("{} {}", envelope.method(), envelope.url().path());

        self.retry
            .execute(&operation, cancel, |attempt| async move {
                let mut request = envelope.build(&self.client)?;
                self.auth.apply(request.headers_mut())?;
                debug!("{} {} (attempt {})", request.method(), request.url(), attempt + 1);

                self.client
                    .execute(request)
                    .await
                    .map_err(TofuPilotError::network)
            })
            .await
    }
}

fn without_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
