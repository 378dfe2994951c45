//! Error handling in [`kubemap`][crate]
use thiserror::Error;

pub use kubemap_core::ErrorResponse;

/// Possible errors when working with [`kubemap`][crate]
#[derive(Error, Debug)]
pub enum Error {
    /// ApiError for when things fail
    ///
    /// Any non-success response other than `404 Not Found`.
    /// A `401` or `403` during discovery usually means the request went out anonymously.
    #[error("ApiError: {0} ({0:?})")]
    Api(#[source] ErrorResponse),

    /// The requested path does not exist on the apiserver
    ///
    /// Kept apart from [`Error::Api`] so that a missing api can be told apart from an unreachable server.
    #[error("NotFound: {0}")]
    NotFound(#[source] ErrorResponse),

    /// Hyper error
    #[error("HyperError: {0}")]
    HyperError(#[source] hyper::Error),

    /// Service error
    #[error("ServiceError: {0}")]
    Service(#[source] tower::BoxError),

    /// Reading the response exceeded the configured read timeout
    #[error("ReadTimeout: {0}")]
    ReadTimeout(#[source] tower::BoxError),

    /// UTF-8 Error
    #[error("UTF-8 Error: {0}")]
    FromUtf8(#[source] std::string::FromUtf8Error),

    /// Http based error
    #[error("HttpError: {0}")]
    HttpError(#[source] http::Error),

    /// Failed to construct a URI.
    #[error("InvalidUri: {0}")]
    InvalidUri(#[source] http::uri::InvalidUri),

    /// Common error case when requesting parsing into own structs
    #[error("Error deserializing response: {0}")]
    SerdeError(#[source] serde_json::Error),

    /// Configuration error
    #[error("Error loading config: {0}")]
    Config(#[source] ConfigError),

    /// Discovery errors
    #[error("Error from discovery: {0}")]
    Discovery(#[source] DiscoveryError),

    /// Errors from client-less endpoint handling
    #[error("Error resolving endpoint: {0}")]
    Core(#[source] kubemap_core::Error),

    /// Cluster url uses https but no TLS stack is compiled in
    #[error("TLS required but no TLS stack selected")]
    TlsRequired,
}

impl From<kubemap_core::Error> for Error {
    fn from(err: kubemap_core::Error) -> Self {
        Self::Core(err)
    }
}

#[derive(Error, Debug)]
// Redundant with the error messages and machine names
#[allow(missing_docs)]
/// Possible errors when loading config
pub enum ConfigError {
    #[error("Unable to find cluster url, {env} must be defined")]
    MissingClusterUrl { env: &'static str },

    #[error("Cluster url {url} has no scheme or authority")]
    IncompleteClusterUrl { url: String },
}

#[derive(Error, Debug)]
// Redundant with the error messages and machine names
#[allow(missing_docs)]
/// Possible errors when using API discovery
pub enum DiscoveryError {
    #[error("No endpoint found for {kind}, version {version}")]
    MissingEndpoint { kind: String, version: String },
}

impl Error {
    /// Whether this error says the apiserver does not serve a path or a kind.
    ///
    /// True for transport `404`s and for kinds missing from a completed discovery.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Discovery(DiscoveryError::MissingEndpoint { .. })
        )
    }
}
