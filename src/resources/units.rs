use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    CreateUnitRequest, DeleteResponse, ListUnitsRequest, PaginatedResponse, Unit,
    UpdateUnitRequest,
};

use super::Query;

/// `/v2/units`
#[derive(Debug, Clone)]
pub struct UnitsResource {
    http: HttpClient,
}

impl UnitsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListUnitsRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Unit>> {
        let mut url = self.http.endpoint(&["v2", "units"])?;
        Query::new()
            .opt("searchQuery", request.search_query.as_deref())
            .list("ids", &request.ids)
            .list("serialNumbers", &request.serial_numbers)
            .list("partNumbers", &request.part_numbers)
            .opt("limit", request.limit)
            .opt("cursor", request.cursor)
            .apply(&mut url);
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip_all, fields(serial_number = %request.serial_number))]
    pub async fn create(&self, request: &CreateUnitRequest, cancel: &CancellationToken) -> Result<Unit> {
        let url = self.http.endpoint(&["v2", "units"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Unit> {
        let url = self.http.endpoint(&["v2", "units", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateUnitRequest,
        cancel: &CancellationToken,
    ) -> Result<Unit> {
        let url = self.http.endpoint(&["v2", "units", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<DeleteResponse> {
        let url = self.http.endpoint(&["v2", "units", id])?;
        self.http.delete(url.as_str(), cancel).await
    }

    /// Makes `child_id` a sub-unit of `parent_id`.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn add_child(
        &self,
        parent_id: &str,
        child_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Unit> {
        let url = self
            .http
            .endpoint(&["v2", "units", parent_id, "children", child_id])?;
        self.http
            .post(url.as_str(), &serde_json::json!({}), cancel)
            .await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn remove_child(
        &self,
        parent_id: &str,
        child_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Unit> {
        let url = self
            .http
            .endpoint(&["v2", "units", parent_id, "children", child_id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}
