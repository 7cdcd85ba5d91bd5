use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    CreateStationRequest, DeleteResponse, LinkProcedureRequest, ListStationsRequest,
    PaginatedResponse, Station, UpdateStationRequest,
};

use super::Query;

/// `/v2/stations`
#[derive(Debug, Clone)]
pub struct StationsResource {
    http: HttpClient,
}

impl StationsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListStationsRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Station>> {
        let mut url = self.http.endpoint(&["v2", "stations"])?;
        Query::new()
            .opt("searchQuery", request.search_query.as_deref())
            .list("ids", &request.ids)
            .opt("limit", request.limit)
            .opt("cursor", request.cursor)
            .apply(&mut url);
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip_all, fields(name = %request.name))]
    pub async fn create(
        &self,
        request: &CreateStationRequest,
        cancel: &CancellationToken,
    ) -> Result<Station> {
        let url = self.http.endpoint(&["v2", "stations"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Station> {
        let url = self.http.endpoint(&["v2", "stations", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateStationRequest,
        cancel: &CancellationToken,
    ) -> Result<Station> {
        let url = self.http.endpoint(&["v2", "stations", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    /// Removes a station.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn remove(&self, id: &str, cancel: &CancellationToken) -> Result<DeleteResponse> {
        let url = self.http.endpoint(&["v2", "stations", id])?;
        self.http.delete(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn link_procedure(
        &self,
        station_id: &str,
        procedure_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Station> {
        let url = self
            .http
            .endpoint(&["v2", "stations", station_id, "procedures"])?;
        let request = LinkProcedureRequest {
            procedure_id: procedure_id.to_string(),
        };
        self.http.post(url.as_str(), &request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn unlink_procedure(
        &self,
        station_id: &str,
        procedure_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Station> {
        let url = self
            .http
            .endpoint(&["v2", "stations", station_id, "procedures", procedure_id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}
