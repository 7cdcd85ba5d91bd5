use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    CreateProcedureRequest, CreateProcedureVersionRequest, DeleteResponse, ListProceduresRequest,
    PaginatedResponse, Procedure, ProcedureVersion, UpdateProcedureRequest,
};

use super::Query;

/// `/v2/procedures`
#[derive(Debug, Clone)]
pub struct ProceduresResource {
    http: HttpClient,
    versions: ProcedureVersionsResource,
}

impl ProceduresResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self {
            versions: ProcedureVersionsResource::new(http.clone()),
            http,
        }
    }

    pub fn versions(&self) -> &ProcedureVersionsResource {
        &self.versions
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListProceduresRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Procedure>> {
        let mut url = self.http.endpoint(&["v2", "procedures"])?;
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
        request: &CreateProcedureRequest,
        cancel: &CancellationToken,
    ) -> Result<Procedure> {
        let url = self.http.endpoint(&["v2", "procedures"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Procedure> {
        let url = self.http.endpoint(&["v2", "procedures", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateProcedureRequest,
        cancel: &CancellationToken,
    ) -> Result<Procedure> {
        let url = self.http.endpoint(&["v2", "procedures", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<DeleteResponse> {
        let url = self.http.endpoint(&["v2", "procedures", id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}

/// `/v2/procedures/{procedureId}/versions`
#[derive(Debug, Clone)]
pub struct ProcedureVersionsResource {
    http: HttpClient,
}

impl ProcedureVersionsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        procedure_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<ProcedureVersion>> {
        let url = self
            .http
            .endpoint(&["v2", "procedures", procedure_id, "versions"])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn create(
        &self,
        procedure_id: &str,
        request: &CreateProcedureVersionRequest,
        cancel: &CancellationToken,
    ) -> Result<ProcedureVersion> {
        let url = self
            .http
            .endpoint(&["v2", "procedures", procedure_id, "versions"])?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        procedure_id: &str,
        version_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ProcedureVersion> {
        let url = self
            .http
            .endpoint(&["v2", "procedures", procedure_id, "versions", version_id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        procedure_id: &str,
        version_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteResponse> {
        let url = self
            .http
            .endpoint(&["v2", "procedures", procedure_id, "versions", version_id])?;
        self.http.delete(url.as_str(), cancel).await
    }
}
