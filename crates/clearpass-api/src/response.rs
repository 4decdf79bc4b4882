// Buffered HTTP response.
//
// The body is read eagerly so a response can be inspected more than once
// and handed back to callers after the connection is released.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Error;

/// Status, headers, and raw body of one API response.
///
/// Status codes are not interpreted here; that is up to each caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub(crate) async fn read(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| {
            let preview: String = self.body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: self.body.clone(),
            }
        })
    }

    /// Decode the body if the status matches `expected`.
    ///
    /// A status mismatch or an undecodable body is logged and yields `None`.
    pub(crate) fn payload<T: DeserializeOwned>(&self, expected: StatusCode) -> Option<T> {
        if self.status != expected {
            warn!(status = self.status.as_u16(), "HTTP error");
            return None;
        }
        match self.json() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "bad response");
                None
            }
        }
    }
}
