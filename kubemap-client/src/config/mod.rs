//! Connection configuration for the discovery [`Client`][crate::Client].
//!
//! # Usage
//! Build a [`Config`] from a cluster url, or from the `KUBEMAP_CLUSTER_URL` environment variable,
//! and pass it to a [`Client`][crate::Client].
use std::time::Duration;

use crate::{error::ConfigError, Error, Result};

/// Environment variable read by [`Config::from_env`]
pub const CLUSTER_URL_ENV: &str = "KUBEMAP_CLUSTER_URL";

/// Default timeout for reading a discovery response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(295);

/// Default timeout for establishing a connection to the apiserver
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration object detailing the cluster url and the transport timeouts.
///
/// It exists to be consumed by the [`Client`][crate::Client].
#[derive(Debug, Clone)]
pub struct Config {
    /// The configured cluster url
    pub cluster_url: http::Uri,
    /// Timeout for establishing a connection.
    ///
    /// A value of `None` means no timeout
    pub connect_timeout: Option<Duration>,
    /// Timeout for reading a response.
    ///
    /// A value of `None` means no timeout
    pub read_timeout: Option<Duration>,
    /// Timeout for writing a request.
    ///
    /// A value of `None` means no timeout
    pub write_timeout: Option<Duration>,
}

impl Config {
    /// Construct a new config where only the `cluster_url` is set by the user,
    /// and everything else receives a default value.
    pub fn new(cluster_url: http::Uri) -> Self {
        Self {
            cluster_url,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            write_timeout: None,
        }
    }

    /// Parse the cluster url and construct a config from it.
    ///
    /// Fails when the url is malformed or lacks a scheme or host.
    pub fn from_cluster_url(url: &str) -> Result<Self> {
        let cluster_url = url.trim().parse::<http::Uri>().map_err(Error::InvalidUri)?;
        if cluster_url.scheme().is_none() || cluster_url.authority().is_none() {
            return Err(Error::Config(ConfigError::IncompleteClusterUrl { url: url.to_string() }));
        }
        Ok(Self::new(cluster_url))
    }

    /// Construct a config from the cluster url in [`CLUSTER_URL_ENV`]
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(CLUSTER_URL_ENV).map_err(|_| {
            Error::Config(ConfigError::MissingClusterUrl { env: CLUSTER_URL_ENV })
        })?;
        tracing::debug!(url = url.as_str(), "Using cluster url from environment");
        Self::from_cluster_url(&url)
    }

    /// Override the read timeout
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Override the connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
