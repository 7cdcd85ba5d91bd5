//! Fully buffered request description that can be replayed any number of times.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::Serialize;
use url::Url;

use crate::error::{Result, TofuPilotError};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A single file carried in a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}

impl FilePart {
    fn to_form(&self) -> Result<Form> {
        let part = Part::stream_with_length(self.content.clone(), self.content.len() as u64)
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
            .map_err(|e| {
                TofuPilotError::Configuration(format!(
                    "invalid content type '{}': {}",
                    self.content_type, e
                ))
            })?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Bytes { content: Bytes, content_type: String },
    Multipart(FilePart),
}

/// Method, target, headers and body of one logical call.
///
/// The body is held as [`Bytes`], so cloning an envelope never copies or
/// consumes the payload and every retry sends identical bytes.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl RequestEnvelope {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serializes `body` to JSON once, up front.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let content = serde_json::to_vec(body).map_err(TofuPilotError::Serialization)?;
        Ok(self.bytes(content, JSON_CONTENT_TYPE))
    }

    pub fn bytes(mut self, content: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content: content.into(),
            content_type: content_type.into(),
        });
        self
    }

    pub fn multipart(mut self, part: FilePart) -> Self {
        self.body = Some(RequestBody::Multipart(part));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Builds a fresh transport request. Called once per attempt.
    pub(crate) fn build(&self, client: &Client) -> Result<reqwest::Request> {
        let mut builder = client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());

        match &self.body {
            Some(RequestBody::Bytes {
                content,
                content_type,
            }) => {
                builder = builder
                    .header(CONTENT_TYPE, content_type.as_str())
                    .body(content.clone());
            }
            Some(RequestBody::Multipart(part)) => {
                builder = builder.multipart(part.to_form()?);
            }
            None => {}
        }

        builder
            .build()
            .map_err(|e| TofuPilotError::Configuration(format!("invalid request: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT;

    fn url() -> Url {
        Url::parse("https://www.tofupilot.com/v2/runs").unwrap()
    }

    #[test]
    fn test_json_body_serialized_once() {
        let envelope = RequestEnvelope::new(Method::POST, url())
            .json(&serde_json::json!({"serialNumber": "SN-1"}))
            .unwrap();

        match envelope.body() {
            Some(RequestBody::Bytes {
                content,
                content_type,
            }) => {
                assert_eq!(content_type, JSON_CONTENT_TYPE);
                assert_eq!(&content[..], br#"{"serialNumber":"SN-1"}"#);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_clones_keep_headers_and_identical_body() {
        let client = Client::new();
        let envelope = RequestEnvelope::new(Method::PATCH, url())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .bytes(vec![0u8, 1, 2, 3, 255], "application/octet-stream");

        for _ in 0..5 {
            let request = envelope.clone().build(&client).unwrap();
            assert_eq!(request.method(), &Method::PATCH);
            assert_eq!(request.url(), &url());
            assert_eq!(request.headers()[ACCEPT], "application/json");
            assert_eq!(request.headers()[CONTENT_TYPE], "application/octet-stream");
            assert_eq!(
                request.body().and_then(|b| b.as_bytes()),
                Some(&[0u8, 1, 2, 3, 255][..])
            );
        }

        // The original is still intact after being cloned.
        assert!(envelope.build(&client).is_ok());
    }

    #[test]
    fn test_multipart_rebuilt_per_attempt() {
        let client = Client::new();
        let envelope = RequestEnvelope::new(Method::POST, url()).multipart(FilePart {
            field_name: "file".to_string(),
            file_name: "log.txt".to_string(),
            content_type: "text/plain".to_string(),
            content: Bytes::from_static(b"hello"),
        });

        for _ in 0..3 {
            let request = envelope.build(&client).unwrap();
            let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
            assert!(content_type.starts_with("multipart/form-data; boundary="));
        }
    }

    #[test]
    fn test_invalid_multipart_content_type_is_configuration_error() {
        let envelope = RequestEnvelope::new(Method::POST, url()).multipart(FilePart {
            field_name: "file".to_string(),
            file_name: "log.txt".to_string(),
            content_type: "not a mime".to_string(),
            content: Bytes::new(),
        });

        let err = envelope.build(&Client::new()).unwrap_err();
        assert!(matches!(err, TofuPilotError::Configuration(_)));
    }
}
