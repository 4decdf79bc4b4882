// reqwest::Client construction from a ClientConfig.
//
// Timeouts and certificate verification are fixed per client. No retry,
// redirect, or cookie policy is layered on top of reqwest's defaults.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Error;

const USER_AGENT: &str = concat!("clearpass-api/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` for the given connection settings.
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.timeout.connect())
        .read_timeout(config.timeout.read())
        .user_agent(USER_AGENT);

    if !config.verify_cert {
        // rustls does not warn on accepted invalid certificates, so there is
        // nothing further to silence here.
        debug!(host = %config.host, "certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
}
