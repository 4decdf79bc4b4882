// Static host list endpoints
//
// A static host list is replaced as a whole; there is no per-entry update.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::Error;
use crate::pagination::Item;

#[derive(Deserialize)]
struct HostEntries {
    host_entries: Vec<Item>,
}

/// Operations on static host lists, addressed by name.
pub struct StaticHostListOperator<'a> {
    client: &'a Client,
}

impl<'a> StaticHostListOperator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch the host entries of the named list.
    ///
    /// `GET /static-host-list/name/{name}`
    pub async fn get_host_entries(&self, name: &str) -> Result<Option<Vec<Item>>, Error> {
        debug!(name, "fetching static host list");
        let url = self.client.resource_url(&["static-host-list", "name", name])?;
        let resp = self.client.send(Method::GET, url, &[], None).await?;
        Ok(resp
            .payload::<HostEntries>(StatusCode::OK)
            .map(|list| list.host_entries))
    }

    /// Replace every host entry of the named list, returning the entries
    /// the server now holds. A list cannot be emptied this way, so
    /// `host_entries` must not be empty.
    ///
    /// `PATCH /static-host-list/name/{name}` with `{"host_entries": [...]}`
    pub async fn replace_host_entries(
        &self,
        name: &str,
        host_entries: &[Item],
    ) -> Result<Option<Vec<Item>>, Error> {
        if host_entries.is_empty() {
            warn!(name, "refusing to replace with an empty host entry list");
            return Err(Error::invalid_argument("The host entry list is empty."));
        }

        debug!(name, count = host_entries.len(), "replacing static host list entries");
        let body = json!({ "host_entries": host_entries });
        let url = self.client.resource_url(&["static-host-list", "name", name])?;
        let resp = self.client.send(Method::PATCH, url, &[], Some(&body)).await?;
        Ok(resp
            .payload::<HostEntries>(StatusCode::OK)
            .map(|list| list.host_entries))
    }
}

impl Client {
    /// Static host list operations on this client.
    pub fn static_host_lists(&self) -> StaticHostListOperator<'_> {
        StaticHostListOperator::new(self)
    }
}
