// Connection configuration for a ClearPass API server.
//
// Every recognized option is an explicit field with a default; validation
// happens once, when a `Client` is built from the config.

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Default HTTPS port. Omitted from the base URL when in use.
pub const DEFAULT_PORT: u16 = 443;

/// Default timeout applied to both the connect and read phases.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Same limit for connecting and for waiting on the response.
    Uniform(Duration),
    /// Separate connect and read limits.
    Split { connect: Duration, read: Duration },
}

impl Timeout {
    /// Limit for establishing the connection.
    pub fn connect(&self) -> Duration {
        match *self {
            Self::Uniform(d) => d,
            Self::Split { connect, .. } => connect,
        }
    }

    /// Limit for each read from the server.
    pub fn read(&self) -> Duration {
        match *self {
            Self::Uniform(d) => d,
            Self::Split { read, .. } => read,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::Uniform(DEFAULT_TIMEOUT)
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Uniform(d)
    }
}

/// Connection settings owned by a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API server hostname or IP address.
    pub host: String,
    /// API server listening port (1-65535).
    pub port: u16,
    pub timeout: Timeout,
    /// Validate the server certificate. Off by default, since appliances
    /// commonly ship with self-signed certificates.
    pub verify_cert: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: Timeout::default(),
            verify_cert: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn with_verify_cert(mut self, verify_cert: bool) -> Self {
        self.verify_cert = verify_cert;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::invalid_argument("The host is empty."));
        }
        if self.port == 0 {
            return Err(Error::invalid_argument("The port is invalid."));
        }
        if self.timeout.connect().is_zero() || self.timeout.read().is_zero() {
            return Err(Error::invalid_argument("The timeout is invalid."));
        }
        Ok(())
    }

    /// `https://{host}[:{port}]/api`, the port omitted when it is 443.
    pub fn base_url(&self) -> Result<Url, Error> {
        let raw = if self.port == DEFAULT_PORT {
            format!("https://{}/api", self.host)
        } else {
            format!("https://{}:{}/api", self.host, self.port)
        };
        Ok(Url::parse(&raw)?)
    }
}
