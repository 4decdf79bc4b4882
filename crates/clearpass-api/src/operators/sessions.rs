// Active session endpoints
//
// Listing via `/session` and the disconnect / reauthorize actions on a
// single session.

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::pagination::{Item, ListQuery};

/// Sessions that have not stopped accounting.
pub const DEFAULT_FILTER: &str = r#"{"acctstoptime":{"$exists":false}}"#;
/// Newest sessions first.
pub const DEFAULT_SORT: &str = "-id";

impl ListQuery {
    /// Active sessions only, newest first, 1000 per page, at most 10 pages.
    pub fn active_sessions() -> Self {
        Self::new(DEFAULT_FILTER, Some(DEFAULT_SORT.to_owned()))
    }
}

/// Operations on active sessions.
pub struct ActiveSessionOperator<'a> {
    client: &'a Client,
}

impl<'a> ActiveSessionOperator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List sessions matching `query`.
    ///
    /// `GET /session?filter=&sort=&offset=&limit=`
    pub async fn get_list(&self, query: &ListQuery) -> Result<Option<Vec<Item>>, Error> {
        debug!("listing active sessions");
        self.client.get_all_pages("/session", query).await
    }

    /// Disconnect an active session.
    ///
    /// `POST /session/{id}/disconnect` with `{"id", "confirm_disconnect": true}`
    ///
    /// The confirm flag is a JSON boolean, not the string `"true"`.
    pub async fn disconnect(&self, session_id: &str) -> Result<Option<Value>, Error> {
        debug!(session_id, "disconnecting session");
        let body = json!({
            "id": session_id,
            "confirm_disconnect": true,
        });

        let url = self
            .client
            .resource_url(&["session", session_id, "disconnect"])?;
        let resp = self.client.send(Method::POST, url, &[], Some(&body)).await?;
        Ok(resp.payload(StatusCode::OK))
    }

    /// Reauthorize an active session with the given profile.
    ///
    /// `POST /session/{id}/reauthorize` with
    /// `{"id", "confirm_reauthorize": true, "reauthorize_profile"}`
    ///
    /// The confirm flag is a JSON boolean, not the string `"true"`.
    pub async fn reauthorize(
        &self,
        session_id: &str,
        profile: &str,
    ) -> Result<Option<Value>, Error> {
        debug!(session_id, profile, "reauthorizing session");
        let body = json!({
            "id": session_id,
            "confirm_reauthorize": true,
            "reauthorize_profile": profile,
        });

        let url = self
            .client
            .resource_url(&["session", session_id, "reauthorize"])?;
        let resp = self.client.send(Method::POST, url, &[], Some(&body)).await?;
        Ok(resp.payload(StatusCode::OK))
    }
}

impl Client {
    /// Active session operations on this client.
    pub fn sessions(&self) -> ActiveSessionOperator<'_> {
        ActiveSessionOperator::new(self)
    }
}
