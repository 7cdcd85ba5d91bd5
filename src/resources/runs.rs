use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    CreateRunRequest, DeleteResponse, ListRunsRequest, PaginatedResponse, Run, UpdateRunRequest,
};

use super::Query;

const RUNS: &[&str] = &["v2", "runs"];

/// `/v2/runs`
#[derive(Debug, Clone)]
pub struct RunsResource {
    http: HttpClient,
}

impl RunsResource {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        request: &ListRunsRequest,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResponse<Run>> {
        let mut url = self.http.endpoint(RUNS)?;
        list_query(request).apply(&mut url);
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip_all, fields(serial_number = %request.serial_number))]
    pub async fn create(&self, request: &CreateRunRequest, cancel: &CancellationToken) -> Result<Run> {
        let url = self.http.endpoint(RUNS)?;
        self.http.post(url.as_str(), request, cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Run> {
        let url = self.http.endpoint(&["v2", "runs", id])?;
        self.http.get(url.as_str(), cancel).await
    }

    #[tracing::instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateRunRequest,
        cancel: &CancellationToken,
    ) -> Result<Run> {
        let url = self.http.endpoint(&["v2", "runs", id])?;
        self.http.patch(url.as_str(), request, cancel).await
    }

    /// Deletes several runs in one call.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete<S: AsRef<str> + std::fmt::Debug>(
        &self,
        ids: &[S],
        cancel: &CancellationToken,
    ) -> Result<DeleteResponse> {
        let mut url = self.http.endpoint(RUNS)?;
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        Query::new().list("ids", &ids).apply(&mut url);
        self.http.delete(url.as_str(), cancel).await
    }
}

fn list_query(request: &ListRunsRequest) -> Query {
    Query::new()
        .opt("searchQuery", request.search_query.as_deref())
        .list("ids", &request.ids)
        .list("outcomes", &request.outcomes)
        .list("procedureIds", &request.procedure_ids)
        .list("procedureVersions", &request.procedure_versions)
        .list("serialNumbers", &request.serial_numbers)
        .list("partNumbers", &request.part_numbers)
        .list("revisionNumbers", &request.revision_numbers)
        .opt("durationMin", request.duration_min.as_deref())
        .opt("durationMax", request.duration_max.as_deref())
        .time("startedAfter", request.started_after)
        .time("startedBefore", request.started_before)
        .time("endedAfter", request.ended_after)
        .time("endedBefore", request.ended_before)
        .time("createdAfter", request.created_after)
        .time("createdBefore", request.created_before)
        .list("createdByUserIds", &request.created_by_user_ids)
        .list("createdByStationIds", &request.created_by_station_ids)
        .list("operatedByIds", &request.operated_by_ids)
        .opt("limit", request.limit)
        .opt("cursor", request.cursor)
        .opt("sortBy", request.sort_by.as_deref())
        .opt("sortOrder", request.sort_order.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunOutcome;
    use url::Url;

    #[test]
    fn test_default_list_query() {
        let mut url = Url::parse("https://example.com/v2/runs").unwrap();
        list_query(&ListRunsRequest::default()).apply(&mut url);
        assert_eq!(url.query(), Some("limit=50&sortBy=started_at&sortOrder=desc"));
    }

    #[test]
    fn test_filtered_list_query() {
        let request = ListRunsRequest {
            outcomes: vec![RunOutcome::Pass, RunOutcome::Fail],
            serial_numbers: vec!["SN-1".to_string()],
            cursor: Some(100.0),
            sort_order: None,
            ..Default::default()
        };
        let mut url = Url::parse("https://example.com/v2/runs").unwrap();
        list_query(&request).apply(&mut url);
        assert_eq!(
            url.query(),
            Some("outcomes=PASS&outcomes=FAIL&serialNumbers=SN-1&limit=50&cursor=100&sortBy=started_at")
        );
    }
}
