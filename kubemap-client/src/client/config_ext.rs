use hyper_timeout::TimeoutConnector;
use hyper_util::client::legacy::connect::HttpConnector;

use super::middleware::BaseUriLayer;
use crate::Config;

/// Extensions to [`Config`](crate::Config) for custom [`Client`](crate::Client).
///
/// See [`Client::new`](crate::Client::new) for an example.
///
/// This trait is sealed and cannot be implemented.
pub trait ConfigExt: private::Sealed {
    /// Layer to set the base URI of requests to the configured server.
    fn base_uri_layer(&self) -> BaseUriLayer;

    /// Plain http connector applying the configured connect, read and write timeouts.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn doc() -> Result<(), Box<dyn std::error::Error>> {
    /// # use kubemap_client::{client::{ConfigExt, RequestBody}, Config};
    /// # use hyper_util::rt::TokioExecutor;
    /// let config = Config::from_cluster_url("http://127.0.0.1:8080")?;
    /// let hyper_client: hyper_util::client::legacy::Client<_, RequestBody> =
    ///     hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(config.timeout_connector());
    /// # Ok(())
    /// # }
    /// ```
    fn timeout_connector(&self) -> TimeoutConnector<HttpConnector>;
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Config {}
}

impl ConfigExt for Config {
    fn base_uri_layer(&self) -> BaseUriLayer {
        BaseUriLayer::new(self.cluster_url.clone())
    }

    fn timeout_connector(&self) -> TimeoutConnector<HttpConnector> {
        let mut connector = HttpConnector::new();
        connector.enforce_http(false);
        let mut connector = TimeoutConnector::new(connector);
        connector.set_connect_timeout(self.connect_timeout);
        connector.set_read_timeout(self.read_timeout);
        connector.set_write_timeout(self.write_timeout);
        connector
    }
}
