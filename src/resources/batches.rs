use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    Batch, CreateBatchRequest, DeleteResponse, ListBatchesRequest, PaginatedResponse,
    UpdateBatchRequest,
};

use super::Query;

/// `/v2/batches`
#[derive(Debug, Clone)]
pub struct BatchesResource {
    http: HttpClient,
}

impl BatchesResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListBatchesRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Batch>> {
        let mut url = self.http.endpoint(&["v2", "batches"])?;
        Query::new()
            .opt("searchQuery", request.search_query.as_deref())
            .list("ids", &request.ids)
            .opt("limit", request.limit)
            .opt("cursor", request.cursor)
            .apply(&mut url);
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip_all, fields(batch_number = %request.batch_number))]
    pub async fn create(&self, request: &CreateBatchRequest, cancel: &CancellationToken) -> Result<Batch> {
        let url = self.http.endpoint(&["v2", "batches"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Batch> {
        let url = self.http.endpoint(&["v2", "batches", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateBatchRequest,
        cancel: &CancellationToken,
    ) -> Result<Batch> {
        let url = self.http.endpoint(&["v2", "batches", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<DeleteResponse> {
        let url = self.http.endpoint(&["v2", "batches", id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}
