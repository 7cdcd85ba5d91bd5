use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    CreatePartRequest, CreatePartRevisionRequest, DeleteResponse, ListPartsRequest,
    PaginatedResponse, Part, PartRevision, UpdatePartRequest, UpdatePartRevisionRequest,
};

use super::Query;

/// `/v2/parts`
#[derive(Debug, Clone)]
pub struct PartsResource {
    http: HttpClient,
    revisions: PartRevisionsResource,
}

impl PartsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self {
            revisions: PartRevisionsResource::new(http.clone()),
            http,
        }
    }

    pub fn revisions(&self) -> &PartRevisionsResource {
        &self.revisions
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListPartsRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Part>> {
        let mut url = self.http.endpoint(&["v2", "parts"])?;
        Query::new()
            .opt("searchQuery", request.search_query.as_deref())
            .list("ids", &request.ids)
            .opt("limit", request.limit)
            .opt("cursor", request.cursor)
            .apply(&mut url);
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip_all, fields(part_number = %request.part_number))]
    pub async fn create(&self, request: &CreatePartRequest, cancel: &CancellationToken) -> Result<Part> {
        let url = self.http.endpoint(&["v2", "parts"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Part> {
        let url = self.http.endpoint(&["v2", "parts", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdatePartRequest,
        cancel: &CancellationToken,
    ) -> Result<Part> {
        let url = self.http.endpoint(&["v2", "parts", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }
}

/// `/v2/parts/{partId}/revisions`
#[derive(Debug, Clone)]
pub struct PartRevisionsResource {
    http: HttpClient,
}

impl PartRevisionsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        part_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<PartRevision>> {
        let url = self.http.endpoint(&["v2", "parts", part_id, "revisions"])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn create(
        &self,
        part_id: &str,
        request: &CreatePartRevisionRequest,
        cancel: &CancellationToken,
    ) -> Result<PartRevision> {
        let url = self.http.endpoint(&["v2", "parts", part_id, "revisions"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        part_id: &str,
        revision_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PartRevision> {
        let url = self
            .http
            .endpoint(&["v2", "parts", part_id, "revisions", revision_id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        part_id: &str,
        revision_id: &str,
        request: &UpdatePartRevisionRequest,
        cancel: &CancellationToken,
    ) -> Result<PartRevision> {
        let url = self
            .http
            .endpoint(&["v2", "parts", part_id, "revisions", revision_id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        part_id: &str,
        revision_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteResponse> {
        let url = self
            .http
            .endpoint(&["v2", "parts", part_id, "revisions", revision_id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}
