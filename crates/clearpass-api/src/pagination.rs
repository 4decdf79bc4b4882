// Offset/limit pagination over `{"_embedded": {"items": [...]}}` list
// endpoints.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::Error;

/// One resource object from a list endpoint. Fields are vendor-defined.
pub type Item = Map<String, Value>;

/// Largest page size the server accepts.
pub const MAX_LIMIT: u32 = 1000;
pub const DEFAULT_LIMIT: u32 = 1000;
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Filter, ordering, and paging bounds for a `get_list` call.
///
/// Each operator provides a constructor with its own defaults, e.g.
/// [`ListQuery::active_sessions`] or [`ListQuery::endpoints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Filter expression (JSON), passed through verbatim.
    pub filter: String,
    /// Sort ordering such as `-id`; omitted from the query when `None`.
    pub sort: Option<String>,
    /// Items per request, 1 to 1000.
    pub limit: u32,
    /// Upper bound on the number of requests, at least 1.
    pub max_requests: u32,
}

impl ListQuery {
    pub fn new(filter: impl Into<String>, sort: Option<String>) -> Self {
        Self {
            filter: filter.into(),
            sort,
            limit: DEFAULT_LIMIT,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn without_sort(mut self) -> Self {
        self.sort = None;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            warn!(limit = self.limit, "invalid limit value");
            return Err(Error::invalid_argument("The limit is invalid."));
        }
        if self.max_requests < 1 {
            warn!(max_requests = self.max_requests, "invalid max requests value");
            return Err(Error::invalid_argument("The max requests is invalid."));
        }
        Ok(())
    }

    fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        let offset = u64::from(self.limit) * u64::from(page);
        let mut params = vec![("filter", self.filter.clone())];
        if let Some(ref sort) = self.sort {
            params.push(("sort", sort.clone()));
        }
        params.push(("offset", offset.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "_embedded")]
    embedded: Embedded,
}

#[derive(Deserialize)]
struct Embedded {
    items: Vec<Item>,
}

impl Client {
    /// Collect every item of a list resource, one page at a time.
    ///
    /// Stops after a page holding fewer than `limit` items or after
    /// `max_requests` pages. A non-200 status or a body without
    /// `_embedded.items` on any page yields `Ok(None)`, discarding the
    /// items gathered so far.
    pub async fn get_all_pages(
        &self,
        resource: &str,
        query: &ListQuery,
    ) -> Result<Option<Vec<Item>>, Error> {
        query.validate()?;

        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let mut all = Vec::new();

        for page in 0..query.max_requests {
            let resp = self.get(resource, &query.page_params(page)).await?;
            let Some(envelope) = resp.payload::<Envelope>(StatusCode::OK) else {
                return Ok(None);
            };

            let received = envelope.embedded.items.len();
            debug!(resource, page, received, "page received");
            all.extend(envelope.embedded.items);

            if received < limit {
                break;
            }
        }

        Ok(Some(all))
    }
}
