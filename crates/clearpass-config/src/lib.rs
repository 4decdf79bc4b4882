//! Configuration for ClearPass API clients.
//!
//! TOML profiles layered with `CLEARPASS_` environment variables, and the
//! translation of a profile into a validated `clearpass_api::ClientConfig`
//! plus the `AuthRequest` used to obtain a token.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clearpass_api::{AuthRequest, ClientConfig, GrantType, Timeout};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted before a profile's `client_secret`.
pub const CLIENT_SECRET_ENV: &str = "CLEARPASS_CLIENT_SECRET";
/// Environment variable consulted before a profile's `password`.
pub const PASSWORD_ENV: &str = "CLEARPASS_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Api(#[from] clearpass_api::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let wanted = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(wanted)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: wanted.into(),
            })
    }
}

/// One ClearPass server and the credentials used against it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API server hostname or IP address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds, applied to both connect and read.
    pub timeout: Option<f64>,

    /// Seconds. Must be set together with `read_timeout`; overrides `timeout`.
    pub connect_timeout: Option<f64>,

    /// Seconds. Must be set together with `connect_timeout`.
    pub read_timeout: Option<f64>,

    #[serde(default)]
    pub verify_cert: bool,

    /// One of `client_credentials`, `password`, `refresh_token`.
    #[serde(default = "default_grant_type")]
    pub grant_type: String,

    /// API client identifier registered on the server.
    pub client_id: String,

    /// Client secret (plaintext; prefer `CLEARPASS_CLIENT_SECRET`).
    pub client_secret: Option<String>,

    /// Username for the `password` grant.
    pub username: Option<String>,

    /// Password for the `password` grant (plaintext; prefer `CLEARPASS_PASSWORD`).
    pub password: Option<String>,
}

fn default_port() -> u16 {
    clearpass_api::config::DEFAULT_PORT
}
fn default_grant_type() -> String {
    GrantType::ClientCredentials.to_string()
}

impl Profile {
    /// Connection settings for this profile, validated.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let timeout = match (self.connect_timeout, self.read_timeout) {
            (Some(connect), Some(read)) => Timeout::Split {
                connect: seconds("connect_timeout", connect)?,
                read: seconds("read_timeout", read)?,
            },
            (None, None) => self
                .timeout
                .map(|t| seconds("timeout", t))
                .transpose()?
                .map_or_else(Timeout::default, Timeout::Uniform),
            _ => {
                return Err(ConfigError::Validation {
                    field: "connect_timeout".into(),
                    reason: "connect_timeout and read_timeout must be set together".into(),
                });
            }
        };

        let config = ClientConfig::new(self.host.clone())
            .with_port(self.port)
            .with_timeout(timeout)
            .with_verify_cert(self.verify_cert);
        config.validate()?;
        Ok(config)
    }

    /// The `/oauth` request for this profile.
    ///
    /// Secrets are taken from the environment first, then from the profile.
    pub fn auth_request(&self) -> AuthRequest {
        let mut request = AuthRequest::new(self.grant_type.clone(), self.client_id.clone());
        if let Some(secret) = resolve_secret(CLIENT_SECRET_ENV, self.client_secret.as_ref()) {
            request = request.with_client_secret(secret);
        }
        if let Some(ref username) = self.username {
            request = request.with_username(username.clone());
        }
        if let Some(password) = resolve_secret(PASSWORD_ENV, self.password.as_ref()) {
            request = request.with_password(password);
        }
        request
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

fn resolve_secret(env_name: &str, plaintext: Option<&String>) -> Option<SecretString> {
    std::env::var(env_name)
        .ok()
        .or_else(|| plaintext.cloned())
        .map(SecretString::from)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "clearpass").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("clearpass");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment.
///
/// Environment variables override the file, e.g.
/// `CLEARPASS_PROFILES__LAB__HOST=cppm.lab` sets `profiles.lab.host`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CLEARPASS_").split("__"));

    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
