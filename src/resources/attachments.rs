use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{DeleteAttachmentResponse, InitializeUploadRequest, InitializeUploadResponse};
use crate::upload::AttachmentUploader;

/// `/v2/attachments`, plus the orchestrated upload flow.
#[derive(Debug, Clone)]
pub struct AttachmentsResource {
    http: HttpClient,
    uploader: AttachmentUploader,
}

impl AttachmentsResource {
    pub(crate) fn new(http: HttpClient, uploader: AttachmentUploader) -> Self {
        Self { http, uploader }
    }

    /// Opens an upload session. Most callers want [`upload`](Self::upload).
    #[tracing::instrument(skip_all, fields(file = %request.file_name))]
    pub async fn initialize(
        &self,
        request: &InitializeUploadRequest,
        cancel: &CancellationToken,
    ) -> Result<InitializeUploadResponse> {
        let url = self.http.endpoint(&["v2", "attachments", "initialize"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteAttachmentResponse> {
        let url = self.http.endpoint(&["v2", "attachments", id])?;
        self.http.delete(url.as_str(), cancel).await
    }

    /// Validates, uploads and links `paths` to a run. Returns the upload ids.
    pub async fn upload<P: AsRef<Path>>(
        &self,
        run_id: &str,
        paths: &[P],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        self.uploader.upload(run_id, paths, cancel).await
    }
}
