use anyhow::Context;
use std::env;

use crate::types::SeedResult;

/// Environment variable that overrides the server host.
pub const HOST_ENV: &str = "HOST";
/// Environment variable that overrides the server port.
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8001;

/// The server that the client commands are pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    host: String,
    port: u16,
    base_url: String,
}

impl ConnectionTarget {
    /// Create a target for `http://{host}:{port}`, failing if that is not a valid URL.
    pub fn new(host: impl Into<String>, port: u16) -> SeedResult<Self> {
        let host = host.into();
        let base_url = format!("http://{host}:{port}");
        url::Url::parse(&base_url)
            .with_context(|| format!("'{base_url}' is not a valid server URL"))?;

        Ok(Self {
            host,
            port,
            base_url,
        })
    }

    /// Build the target from the [`HOST_ENV`] and [`PORT_ENV`] environment variables, falling
    /// back to [`DEFAULT_HOST`] and [`DEFAULT_PORT`].
    pub fn from_env() -> SeedResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ConnectionTarget::from_env`] but reads variables through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SeedResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let host = non_empty(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty(PORT_ENV) {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("'{PORT_ENV}={port}' is not a valid port"))?,
            None => DEFAULT_PORT,
        };

        Self::new(host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://{host}:{port}` with no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL that runs for the product with the given endpoint are stored to.
    pub fn product_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }
}
