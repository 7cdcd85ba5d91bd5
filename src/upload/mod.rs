//! Attachment uploads: validate, initialize, transfer, link.
//!
//! Each file goes through three calls:
//!
//! 1. `POST /v2/attachments/initialize` returns an upload id and a presigned URL.
//! 2. The file bytes are PUT straight to that URL, without credentials or retries.
//! 3. `PATCH /v2/runs/{id}` links the upload id to the run.
//!
//! Every file is validated before the first request goes out, and the first
//! failing step aborts the whole operation. Nothing is cleaned up on the
//! server after a partial upload.

mod content_type;

pub use content_type::{DEFAULT_CONTENT_TYPE, content_type_for};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TofuPilotError, ValidationError};
use crate::http::{HttpClient, cancellable};
use crate::models::{InitializeUploadRequest, InitializeUploadResponse, Run, UpdateRunRequest};
use crate::runtime::Runtime;

pub const DEFAULT_MAX_ATTACHMENTS: usize = 20;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Per-operation attachment bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentLimits {
    pub max_attachments: usize,
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// A file that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
    pub size: u64,
}

/// Checks the whole batch before anything is sent.
///
/// The count is checked first, then every file for existence and size.
pub fn validate_attachments<P: AsRef<Path>>(
    runtime: &dyn Runtime,
    paths: &[P],
    limits: &AttachmentLimits,
) -> Result<Vec<AttachmentFile>, ValidationError> {
    if paths.len() > limits.max_attachments {
        return Err(ValidationError::TooManyAttachments {
            count: paths.len(),
            max: limits.max_attachments,
        });
    }

    paths
        .iter()
        .map(|path| validate_file(runtime, path.as_ref(), limits))
        .collect()
}

fn validate_file(
    runtime: &dyn Runtime,
    path: &Path,
    limits: &AttachmentLimits,
) -> Result<AttachmentFile, ValidationError> {
    if !runtime.exists(path) {
        return Err(ValidationError::FileMissing(path.to_path_buf()));
    }

    let size = runtime
        .file_size(path)
        .map_err(|_| ValidationError::FileMissing(path.to_path_buf()))?;
    if size > limits.max_file_size {
        return Err(ValidationError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max: limits.max_file_size,
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(AttachmentFile {
        path: path.to_path_buf(),
        file_name,
        content_type: content_type_for(path),
        size,
    })
}

/// Upload id and destination for one file. Used once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub upload_id: String,
    pub presigned_url: String,
}

impl TryFrom<InitializeUploadResponse> for UploadSession {
    type Error = TofuPilotError;

    fn try_from(response: InitializeUploadResponse) -> Result<Self> {
        match (response.id, response.upload_url) {
            (Some(upload_id), Some(presigned_url))
                if !upload_id.is_empty() && !presigned_url.is_empty() =>
            {
                Ok(Self {
                    upload_id,
                    presigned_url,
                })
            }
            _ => Err(TofuPilotError::deserialization(
                "initialize response is missing the upload id or URL",
                None,
            )),
        }
    }
}

/// Drives the three-step upload for a run.
#[derive(Clone)]
pub struct AttachmentUploader {
    http: HttpClient,
    runtime: Arc<dyn Runtime>,
    limits: AttachmentLimits,
}

impl fmt::Debug for AttachmentUploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentUploader")
            .field("base_url", &self.http.base_url().as_str())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl AttachmentUploader {
    pub fn new(http: HttpClient, runtime: Arc<dyn Runtime>, limits: AttachmentLimits) -> Self {
        Self {
            http,
            runtime,
            limits,
        }
    }

    /// Uploads `paths` and links each one to `run_id`.
    ///
    /// Returns the upload ids in input order.
    #[tracing::instrument(skip(self, paths, cancel), fields(count = paths.len()))]
    pub async fn upload<P: AsRef<Path>>(
        &self,
        run_id: &str,
        paths: &[P],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let files = validate_attachments(self.runtime.as_ref(), paths, &self.limits)?;
        debug!("Validated {} attachment(s) for run {}", files.len(), run_id);

        let mut ids = Vec::with_capacity(files.len());
        for file in &files {
            let id = self.upload_one(run_id, file, cancel).await?;
            ids.push(id);
        }

        info!("Uploaded {} attachment(s) to run {}", ids.len(), run_id);
        Ok(ids)
    }

    async fn upload_one(
        &self,
        run_id: &str,
        file: &AttachmentFile,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let session = self.initialize(file, cancel).await?;
        self.transfer(&session, file, cancel).await?;
        self.link(run_id, &session.upload_id, cancel).await?;
        debug!("Attached {} as {}", file.file_name, session.upload_id);
        Ok(session.upload_id)
    }

    #[tracing::instrument(skip(self, file, cancel), fields(file = %file.file_name))]
    pub async fn initialize(
        &self,
        file: &AttachmentFile,
        cancel: &CancellationToken,
    ) -> Result<UploadSession> {
        let url = self.http.endpoint(&["v2", "attachments", "initialize"])?;
        let request = InitializeUploadRequest {
            file_name: file.file_name.clone(),
            content_type: Some(file.content_type.to_string()),
            file_size: Some(file.size),
        };
        let response: InitializeUploadResponse =
            self.http.post(url.as_str(), &request, cancel).await?;
        UploadSession::try_from(response)
    }

    #[tracing::instrument(skip(self, session, file, cancel), fields(file = %file.file_name))]
    pub async fn transfer(
        &self,
        session: &UploadSession,
        file: &AttachmentFile,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let content = cancellable(cancel, async {
            self.runtime
                .read_file(&file.path)
                .await
                .map_err(|source| TofuPilotError::Io {
                    context: format!("reading {}", file.path.display()),
                    source,
                })
        })
        .await?;

        self.http
            .put_presigned(
                &session.presigned_url,
                Bytes::from(content),
                file.content_type,
                cancel,
            )
            .await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn link(&self, run_id: &str, upload_id: &str, cancel: &CancellationToken) -> Result<Run> {
        let url = self.http.endpoint(&["v2", "runs", run_id])?;
        let request = UpdateRunRequest {
            attachments: Some(vec![upload_id.to_string()]),
        };
        self.http.patch(url.as_str(), &request, cancel).await
    }
}
