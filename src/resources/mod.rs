//! Thin CRUD bindings for each API entity.
//!
//! # Structure
//!
//! - `runs` - Test runs
//! - `units` - Units and their parent/child relations
//! - `parts` - Parts and their revisions
//! - `batches` - Production batches
//! - `procedures` - Procedures and their versions
//! - `stations` - Stations and linked procedures
//! - `attachments` - Attachment sessions and orchestrated uploads

mod attachments;
mod batches;
mod parts;
mod procedures;
mod runs;
mod stations;
mod units;

pub use attachments::AttachmentsResource;
pub use batches::BatchesResource;
pub use parts::{PartRevisionsResource, PartsResource};
pub use procedures::{ProcedureVersionsResource, ProceduresResource};
pub use runs::RunsResource;
pub use stations::StationsResource;
pub use units::UnitsResource;

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use crate::error::Result;
use crate::models::PaginatedResponse;

/// Query string under construction.
///
/// Empty values are skipped and list values repeat their key
/// (`ids=a&ids=b`).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn opt<T: ToString>(mut self, key: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.pairs.push((key, value));
            }
        }
        self
    }

    pub(crate) fn list<T: ToString>(mut self, key: &'static str, values: &[T]) -> Self {
        for value in values {
            let value = value.to_string();
            if !value.is_empty() {
                self.pairs.push((key, value));
            }
        }
        self
    }

    /// Timestamps go out as RFC 3339 with millisecond precision.
    pub(crate) fn time(self, key: &'static str, value: Option<DateTime<Utc>>) -> Self {
        self.opt(
            key,
            value.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        )
    }

    pub(crate) fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
    }
}

/// Walks every page of a list endpoint and returns all items.
///
/// `fetch` receives the cursor for the next page (`None` for the first) and
/// is called until the server reports no further pages.
pub async fn collect_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<f64>) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    loop {
        let page = fetch(cursor).await?;
        let next = page.next_cursor();
        let has_more = page.has_more();
        items.extend(page.data);

        match next {
            Some(next) if has_more && Some(next) != cursor => cursor = Some(next),
            _ => return Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationMeta;
    use chrono::TimeZone;

    fn base() -> Url {
        Url::parse("https://example.com/v2/runs").unwrap()
    }

    #[test]
    fn test_query_skips_empty_and_repeats_lists() {
        let mut url = base();
        Query::new()
            .opt("searchQuery", Some("fan test"))
            .opt::<String>("durationMin", None)
            .opt("sortBy", Some(""))
            .list("ids", &["r1", "", "r2"])
            .opt("limit", Some(50))
            .apply(&mut url);

        assert_eq!(
            url.as_str(),
            "https://example.com/v2/runs?searchQuery=fan+test&ids=r1&ids=r2&limit=50"
        );
    }

    #[test]
    fn test_empty_query_leaves_url_alone() {
        let mut url = base();
        Query::new().list::<String>("ids", &[]).apply(&mut url);
        assert_eq!(url.as_str(), "https://example.com/v2/runs");
    }

    #[test]
    fn test_time_rendered_as_rfc3339() {
        let mut url = base();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().unwrap();
        Query::new().time("startedAfter", Some(at)).apply(&mut url);
        assert_eq!(url.query(), Some("startedAfter=2024-03-01T12%3A30%3A00.000Z"));
    }

    #[test]
    fn test_cursor_renders_like_an_integer() {
        let mut url = base();
        Query::new().opt("cursor", Some(1200.0_f64)).apply(&mut url);
        assert_eq!(url.query(), Some("cursor=1200"));
    }

    #[tokio::test]
    async fn test_collect_all_follows_cursor() {
        let pages = std::sync::Mutex::new(vec![
            PaginatedResponse {
                data: vec![3],
                meta: Some(PaginationMeta {
                    has_more: false,
                    next_cursor: None,
                }),
            },
            PaginatedResponse {
                data: vec![1, 2],
                meta: Some(PaginationMeta {
                    has_more: true,
                    next_cursor: Some(2.0),
                }),
            },
        ]);
        let seen = std::sync::Mutex::new(Vec::new());

        let items = collect_all(|cursor| {
            seen.lock().unwrap().push(cursor);
            let page = pages.lock().unwrap().pop().unwrap();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(2.0)]);
    }
}
