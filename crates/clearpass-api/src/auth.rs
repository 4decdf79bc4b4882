// OAuth2 request shaping and bearer-token state.
//
// `AuthRequest` turns a grant type plus credentials into the `/oauth`
// request body. `TokenState` holds what the server returned; it is only
// written by `Client::authenticate`.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::response::ApiResponse;

/// OAuth2 grant types accepted by the `/oauth` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GrantType {
    ClientCredentials,
    Password,
    RefreshToken,
}

/// Credentials for one `/oauth` call.
///
/// The grant type is kept as given so that an unsupported value is only
/// rejected when the body is built, before anything is sent.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    grant_type: String,
    client_id: String,
    client_secret: Option<SecretString>,
    username: Option<String>,
    password: Option<SecretString>,
    refresh_token: Option<SecretString>,
}

impl AuthRequest {
    pub fn new(grant_type: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            grant_type: grant_type.into(),
            client_id: client_id.into(),
            client_secret: None,
            username: None,
            password: None,
            refresh_token: None,
        }
    }

    pub fn client_credentials(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self::new(GrantType::ClientCredentials.to_string(), client_id)
            .with_client_secret(client_secret)
    }

    pub fn password(
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self::new(GrantType::Password.to_string(), client_id)
            .with_username(username)
            .with_password(password)
    }

    pub fn refresh_token(client_id: impl Into<String>, refresh_token: SecretString) -> Self {
        Self::new(GrantType::RefreshToken.to_string(), client_id).with_refresh_token(refresh_token)
    }

    pub fn with_client_secret(mut self, client_secret: SecretString) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: SecretString) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Build the JSON body for `POST /oauth`.
    ///
    /// - `client_credentials`: `grant_type`, `client_id`, `client_secret`
    /// - `password`: `grant_type`, `client_id`, `username`, `password`, and
    ///   `client_secret` only when it is non-empty
    /// - `refresh_token`: `grant_type`, `client_id`, `refresh_token`
    pub fn body(&self) -> Result<Map<String, Value>, Error> {
        let grant: GrantType = self
            .grant_type
            .parse()
            .map_err(|_| Error::invalid_argument("Unsupported grant type."))?;

        let mut body = Map::new();
        body.insert("grant_type".into(), Value::String(self.grant_type.clone()));
        body.insert("client_id".into(), Value::String(self.client_id.clone()));

        match grant {
            GrantType::ClientCredentials => {
                body.insert("client_secret".into(), exposed(self.client_secret.as_ref()));
            }
            GrantType::Password => {
                body.insert(
                    "username".into(),
                    Value::String(self.username.clone().unwrap_or_default()),
                );
                body.insert("password".into(), exposed(self.password.as_ref()));
                if let Some(secret) = self
                    .client_secret
                    .as_ref()
                    .filter(|s| !s.expose_secret().is_empty())
                {
                    body.insert(
                        "client_secret".into(),
                        Value::String(secret.expose_secret().to_owned()),
                    );
                }
            }
            GrantType::RefreshToken => {
                body.insert("refresh_token".into(), exposed(self.refresh_token.as_ref()));
            }
        }

        Ok(body)
    }
}

fn exposed(secret: Option<&SecretString>) -> Value {
    Value::String(secret.map(|s| s.expose_secret().to_owned()).unwrap_or_default())
}

/// Result of [`Client::authenticate`](crate::Client::authenticate).
#[derive(Debug)]
pub enum AuthOutcome {
    /// The server issued a token; the client is now authorized.
    Authorized,
    /// The server answered with something other than 200. Token state is
    /// unchanged; the response is kept for diagnostics.
    Rejected(ApiResponse),
}

impl AuthOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Successful `/oauth` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
struct BearerToken {
    token_type: String,
    access_token: SecretString,
}

/// Bearer-token lifecycle of one client. Never persisted.
///
/// Access token and token type are stored together, so one is never
/// present without the other.
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    bearer: Option<BearerToken>,
    issued_at: Option<DateTime<Utc>>,
    expires_in: Option<TimeDelta>,
    refresh_token: Option<SecretString>,
}

impl TokenState {
    /// Whether an access token is held. Expiration is not considered.
    pub fn is_authorized(&self) -> bool {
        self.bearer.is_some()
    }

    /// `"{token_type} {access_token}"`, or `None` before authorization.
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer
            .as_ref()
            .map(|b| format!("{} {}", b.token_type, b.access_token.expose_secret()))
    }

    pub fn token_type(&self) -> Option<&str> {
        self.bearer.as_ref().map(|b| b.token_type.as_str())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_in(&self) -> Option<TimeDelta> {
        self.expires_in
    }

    /// `issued_at + expires_in`, when both are known.
    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.issued_at?.checked_add_signed(self.expires_in?)
    }

    /// `true` only if the expiration time is known and `now` has reached it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time().is_some_and(|exp| now >= exp)
    }

    /// Refresh token from the most recent response that carried one.
    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    /// Replace the state with a successful `/oauth` response.
    ///
    /// The response is checked as a whole first; on `Err` nothing is
    /// written. An empty token, or an `expires_in` that is negative or
    /// overflows the expiration time, is rejected.
    pub(crate) fn record(
        &mut self,
        token: TokenResponse,
        issued_at: DateTime<Utc>,
    ) -> Result<(), String> {
        if token.access_token.is_empty() || token.token_type.is_empty() {
            return Err("empty access_token or token_type".into());
        }
        let expires_in = TimeDelta::try_seconds(token.expires_in)
            .filter(|d| *d >= TimeDelta::zero())
            .filter(|d| issued_at.checked_add_signed(*d).is_some())
            .ok_or_else(|| format!("expires_in out of range: {}", token.expires_in))?;

        self.bearer = Some(BearerToken {
            token_type: token.token_type,
            access_token: SecretString::from(token.access_token),
        });
        self.issued_at = Some(issued_at);
        self.expires_in = Some(expires_in);
        if let Some(refresh) = token.refresh_token {
            self.refresh_token = Some(SecretString::from(refresh));
        }
        Ok(())
    }
}
