// ClearPass API HTTP client
//
// Single egress point for every API call: URL construction under
// `https://{host}[:{port}]/api`, Authorization header injection, and the
// OAuth2 `/oauth` exchange. Resource operators (sessions, endpoints, static
// host lists) borrow a `Client` and are implemented in `operators/`.

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{AuthOutcome, AuthRequest, TokenResponse, TokenState};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::response::ApiResponse;
use crate::transport;

const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::PUT,
    Method::DELETE,
];

/// Raw HTTP client for the ClearPass RESTful API.
///
/// Holds the bearer-token state for its own lifetime. Token state changes
/// only through [`authenticate`](Self::authenticate), which takes
/// `&mut self`; the client never refreshes on its own.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: TokenState,
}

impl Client {
    /// Validate `config` and build a client for it.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let http = transport::build_client(config)?;
        let base_url = config.base_url()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `base_url` is the API root (the `/api` path included); resources are
    /// appended to it verbatim.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: TokenState::default(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> &TokenState {
        &self.token
    }

    pub fn is_authorized(&self) -> bool {
        self.token.is_authorized()
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.token.authorization_header()
    }

    pub fn expiration_time(&self) -> Option<chrono::DateTime<Utc>> {
        self.token.expiration_time()
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.token.refresh_token()
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, resource: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{resource}"))?)
    }

    /// URL under the API root with each of `segments` pushed as one
    /// percent-encoded path segment.
    ///
    /// Ids, MAC addresses and list names go through here so that `/`, `?`
    /// and `#` stay inside their segment. Empty, `.` and `..` segments are
    /// rejected.
    pub fn resource_url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::invalid_argument(format!("Invalid path segment: {bad:?}")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::invalid_argument("Base URL cannot carry a path."))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send one API request and buffer the response.
    ///
    /// `method` must be GET, POST, PATCH, PUT or DELETE. The Authorization
    /// header is attached when authorized; a JSON body (with its
    /// `Content-Type`) only when `body` has content. The status code is not
    /// interpreted.
    pub async fn request(
        &self,
        method: Method,
        resource: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(resource)?;
        self.send(method, url, params, body).await
    }

    /// [`request`](Self::request) against an already-built URL, such as one
    /// from [`resource_url`](Self::resource_url).
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        if !SUPPORTED_METHODS.contains(&method) {
            return Err(Error::invalid_argument("Unsupported method."));
        }

        debug!("{method} {url} params={params:?}");

        let mut builder = self.http.request(method, url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(header) = self.token.authorization_header() {
            let mut value = HeaderValue::from_str(&header).map_err(|e| {
                Error::invalid_argument(format!("invalid authorization header value: {e}"))
            })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = body.filter(|b| has_content(b)) {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        debug!(status = resp.status().as_u16(), "response received");
        ApiResponse::read(resp).await
    }

    pub async fn get(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, Error> {
        self.request(Method::GET, resource, params, None).await
    }

    pub async fn post(
        &self,
        resource: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        self.request(Method::POST, resource, params, body).await
    }

    pub async fn patch(
        &self,
        resource: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        self.request(Method::PATCH, resource, params, body).await
    }

    pub async fn put(
        &self,
        resource: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        self.request(Method::PUT, resource, params, body).await
    }

    pub async fn delete(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, Error> {
        self.request(Method::DELETE, resource, params, None).await
    }

    // ── Authentication ───────────────────────────────────────────────

    /// OAuth2 authentication against `POST /oauth`.
    ///
    /// An unsupported grant type fails before anything is sent. On HTTP 200
    /// the token state is replaced (the previous refresh token is kept if
    /// the response carries none); a 200 body without `access_token`,
    /// `token_type` or `expires_in` is a `Deserialization` error and leaves
    /// the state untouched, as is one with an empty token or an
    /// `expires_in` out of range. Any other status is returned as
    /// [`AuthOutcome::Rejected`].
    pub async fn authenticate(&mut self, request: &AuthRequest) -> Result<AuthOutcome, Error> {
        let body = Value::Object(request.body()?);
        debug!(
            grant_type = request.grant_type(),
            client_id = request.client_id(),
            "authenticating"
        );

        let resp = self.post("/oauth", &[], Some(&body)).await?;
        if resp.status() != StatusCode::OK {
            warn!(status = resp.status().as_u16(), "authentication rejected");
            return Ok(AuthOutcome::Rejected(resp));
        }

        let issued_at = Utc::now();
        let token: TokenResponse = resp.json()?;
        self.token
            .record(token, issued_at)
            .map_err(|message| Error::Deserialization {
                message,
                body: resp.text().to_owned(),
            })?;

        debug!("authentication successful");
        Ok(AuthOutcome::Authorized)
    }

    /// Re-authenticate with the `refresh_token` grant using the refresh
    /// token held from a previous [`authenticate`](Self::authenticate).
    pub async fn refresh(&mut self, client_id: &str) -> Result<AuthOutcome, Error> {
        let refresh_token = self
            .token
            .refresh_token()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
            .ok_or_else(|| Error::invalid_argument("No refresh token has been issued."))?;
        self.authenticate(&AuthRequest::refresh_token(client_id, refresh_token))
            .await
    }
}

fn has_content(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
