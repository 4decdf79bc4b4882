// Endpoint endpoints
//
// Listing via `/endpoint`, creation, and partial update addressed by MAC
// address.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::pagination::{Item, ListQuery};

/// No filtering.
pub const DEFAULT_FILTER: &str = "{}";
/// Ascending by id.
pub const DEFAULT_SORT: &str = "+id";

impl ListQuery {
    /// All endpoints, ascending by id, 1000 per page, at most 10 pages.
    pub fn endpoints() -> Self {
        Self::new(DEFAULT_FILTER, Some(DEFAULT_SORT.to_owned()))
    }
}

/// Profiling status of an endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
pub enum EndpointStatus {
    Known,
    Unknown,
    Disabled,
}

impl EndpointStatus {
    /// Parse one of `Known`, `Unknown`, `Disabled` (exact case).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        raw.parse::<Self>()
            .map_err(|_| Error::invalid_argument(format!("Unsupported status: {raw}")))
    }
}

/// Optional fields accepted when creating an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_insight_tags: Option<String>,
    /// Additional key/value attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Item>,
}

/// Fields to change on an existing endpoint. Unset fields are left out of
/// the request body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EndpointStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_insight_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Item>,
}

/// Operations on endpoints.
pub struct EndpointOperator<'a> {
    client: &'a Client,
}

impl<'a> EndpointOperator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List endpoints matching `query`.
    ///
    /// `GET /endpoint?filter=&sort=&offset=&limit=`
    pub async fn get_list(&self, query: &ListQuery) -> Result<Option<Vec<Item>>, Error> {
        debug!("listing endpoints");
        self.client.get_all_pages("/endpoint", query).await
    }

    /// Create an endpoint. `status` must be `Known`, `Unknown` or
    /// `Disabled`.
    ///
    /// `POST /endpoint`, expecting 201.
    pub async fn create(
        &self,
        mac_address: &str,
        status: &str,
        extras: &EndpointExtras,
    ) -> Result<Option<Value>, Error> {
        #[derive(Serialize)]
        struct Body<'b> {
            mac_address: &'b str,
            status: EndpointStatus,
            #[serde(flatten)]
            extras: &'b EndpointExtras,
        }

        let status = EndpointStatus::parse(status)?;
        debug!(mac_address, %status, "creating endpoint");

        let body = to_body(&Body {
            mac_address,
            status,
            extras,
        })?;
        let resp = self.client.post("/endpoint", &[], Some(&body)).await?;
        Ok(resp.payload(StatusCode::CREATED))
    }

    /// Update only the fields set in `update`.
    ///
    /// `PATCH /endpoint/mac-address/{mac}`, expecting 200.
    pub async fn update_fields_by_mac(
        &self,
        mac_address: &str,
        update: &EndpointUpdate,
    ) -> Result<Option<Value>, Error> {
        debug!(mac_address, "updating endpoint");
        let body = to_body(update)?;
        let url = self
            .client
            .resource_url(&["endpoint", "mac-address", mac_address])?;
        let resp = self.client.send(Method::PATCH, url, &[], Some(&body)).await?;
        Ok(resp.payload(StatusCode::OK))
    }
}

fn to_body(value: &impl Serialize) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::invalid_argument(e.to_string()))
}

impl Client {
    /// Endpoint operations on this client.
    pub fn endpoints(&self) -> EndpointOperator<'_> {
        EndpointOperator::new(self)
    }
}
