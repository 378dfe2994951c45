//! A discovery client for the Kubernetes and OpenShift apiservers
//!
//! The [`Client`] issues the plain `GET` requests discovery needs and applies the
//! error handling shared by every caller: `404`s become [`Error::NotFound`],
//! any other failure status becomes [`Error::Api`].
//!
//! The [`Client`] is usually handed to a [`TypeMapper`](crate::TypeMapper),
//! which walks the discovery documents and resolves kinds to endpoints.
use std::error::Error as StdError;

use futures::future::BoxFuture;
use http::{Request, Response, StatusCode};
use kubemap_core::{
    discovery::{ApiGroupList, ApiResourceList, ApiVersions},
    ApiPrefix,
};
use serde::de::DeserializeOwned;
use tower::{buffer::Buffer, util::BoxService, BoxError, Layer, Service, ServiceExt};
use tower_http::map_response_body::MapResponseBodyLayer;

use crate::{error::ErrorResponse, Config, Error, Result};

mod body;
mod builder;
mod config_ext;
pub mod middleware;

pub use body::{RequestBody, ResponseBody};
pub use builder::{ClientBuilder, GenericService};
pub use config_ext::ConfigExt;

/// Client for the discovery endpoints of a cluster.
///
/// Construct it from a [`Config`] with [`Client::try_from`],
/// or around a custom [`Service`] stack with [`Client::new`].
#[derive(Clone)]
pub struct Client {
    // - `Buffer` for cheap clone
    // - `BoxFuture` for dynamic response future type
    inner: Buffer<Request<RequestBody>, BoxFuture<'static, Result<Response<ResponseBody>, BoxError>>>,
}

impl Client {
    /// Create a [`Client`] using a custom `Service` stack.
    ///
    /// [`ConfigExt`] provides extensions for building a custom stack.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn doc() -> Result<(), Box<dyn std::error::Error>> {
    /// use kubemap_client::{client::{ConfigExt, RequestBody}, Client, Config};
    /// use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};
    /// use tower::ServiceBuilder;
    ///
    /// let config = Config::from_cluster_url("http://127.0.0.1:8080")?;
    /// let hyper_client: hyper_util::client::legacy::Client<_, RequestBody> =
    ///     hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    /// let service = ServiceBuilder::new()
    ///     .layer(config.base_uri_layer())
    ///     .service(hyper_client);
    /// let client = Client::new(service);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<S, B>(service: S) -> Self
    where
        S: Service<Request<RequestBody>, Response = Response<B>> + Send + 'static,
        S::Future: Send + 'static,
        S::Error: Into<BoxError>,
        B: http_body::Body<Data = bytes::Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        // Erase the response body and error types so `Client` has no type parameters.
        let service = MapResponseBodyLayer::new(body::boxed)
            .layer(service)
            .map_err(|e| e.into());
        Self {
            inner: Buffer::new(BoxService::new(service), 1024),
        }
    }

    /// Perform a raw HTTP request against the apiserver and return the raw response back.
    pub async fn send(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>> {
        let mut svc = self.inner.clone();
        let res = svc
            .ready()
            .await
            .map_err(Error::Service)?
            .call(request)
            .await
            .map_err(|err| {
                // Error decorating request
                err.downcast::<Error>()
                    .map(|e| *e)
                    // Connection went quiet for longer than the read timeout
                    .or_else(|err| {
                        if is_timeout(&*err) {
                            Ok(Error::ReadTimeout(err))
                        } else {
                            Err(err)
                        }
                    })
                    // Error requesting
                    .or_else(|err| err.downcast::<hyper::Error>().map(|err| Error::HyperError(*err)))
                    // Error from another middleware
                    .unwrap_or_else(Error::Service)
            })?;
        Ok(res)
    }

    /// Perform a raw HTTP request against the apiserver and deserialize the response
    /// as JSON to some known type.
    pub async fn request<T>(&self, request: Request<Vec<u8>>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let text = self.request_text(request).await?;
        parse(&text)
    }

    /// Perform a raw HTTP request against the apiserver and get back the response
    /// as a string
    pub async fn request_text(&self, request: Request<Vec<u8>>) -> Result<String> {
        let res = self.send(request.map(RequestBody::from)).await?;
        let status = res.status();
        let text = body::read_text(res.into_body()).await?;
        handle_api_errors(&text, status)?;

        Ok(text)
    }
}

/// Low level discovery requests.
///
/// Each method issues exactly one request.
/// The [`TypeMapper`](crate::TypeMapper) combines them into a full discovery pass.
impl Client {
    /// Lists the versions served by a legacy prefix (`/api` or `/oapi`).
    pub async fn list_legacy_api_versions(&self, prefix: ApiPrefix) -> Result<ApiVersions> {
        if !prefix.is_legacy() {
            return Err(kubemap_core::Error::NotLegacyPrefix(prefix).into());
        }
        let text = self.discovery_text(prefix.as_str()).await?;
        parse(&text)
    }

    /// Lists the named api groups served under `/apis`.
    pub async fn list_api_groups(&self) -> Result<ApiGroupList> {
        let text = self.discovery_text(ApiPrefix::Groups.as_str()).await?;
        parse(&text)
    }

    /// Lists the resources served at a group version path such as `api/v1` or `apis/apps/v1`.
    ///
    /// A blank body is read as an empty list.
    ///
    /// ### Example usage:
    /// ```rust
    /// # async fn scope(client: kubemap_client::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let groups = client.list_api_groups().await?;
    /// for g in groups.groups {
    ///     for v in g.versions {
    ///         let resources = client.list_api_resources(&format!("apis/{}", v.group_version)).await?;
    ///         dbg!(resources);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_api_resources(&self, path: &str) -> Result<ApiResourceList> {
        let text = self.discovery_text(path).await?;
        if text.trim().is_empty() {
            tracing::debug!(path, "Empty resource list");
            return Ok(ApiResourceList::default());
        }
        parse(&text)
    }

    async fn discovery_text(&self, path: &str) -> Result<String> {
        let uri = format!("/{}", path.trim_start_matches('/'));
        tracing::debug!(uri = uri.as_str(), "Discovery request");
        let req = Request::builder()
            .uri(uri.as_str())
            .body(vec![])
            .map_err(Error::HttpError)?;
        let text = self.request_text(req).await.inspect_err(|err| {
            if let Error::Api(status) = err {
                tracing::error!(
                    uri = uri.as_str(),
                    code = status.code,
                    "Unauthorized exception. Can system:anonymous get the API endpoint?"
                );
            }
        })?;
        tracing::debug!(uri = uri.as_str(), bytes = text.len(), "Discovery response");
        tracing::trace!("{}", text);
        Ok(text)
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!("{}, {:?}", text, e);
        Error::SerdeError(e)
    })
}

/// Whether an io timeout sits anywhere in the source chain
fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Apiserver returned error handling
///
/// Either the apiserver returned an explicit status object,
/// or it returned something we couldn't parse as one.
///
/// In either case, present an [`ErrorResponse`] upstream,
/// as [`Error::NotFound`] for a `404` and as [`Error::Api`] otherwise.
fn handle_api_errors(text: &str, s: StatusCode) -> Result<()> {
    if s.is_client_error() || s.is_server_error() {
        let errdata = match serde_json::from_str::<ErrorResponse>(text) {
            Ok(errdata) => {
                tracing::debug!("Unsuccessful: {:?}", errdata);
                errdata
            }
            Err(_) => {
                tracing::warn!("Unsuccessful data error parse: {}", text);
                let ae = ErrorResponse {
                    status: s.to_string(),
                    code: s.as_u16(),
                    message: format!("{:?}", text),
                    reason: "Failed to parse error data".into(),
                };
                tracing::debug!("Unsuccessful: {:?} (reconstruct)", ae);
                ae
            }
        };
        if s == StatusCode::NOT_FOUND {
            Err(Error::NotFound(errdata))
        } else {
            Err(Error::Api(errdata))
        }
    } else {
        Ok(())
    }
}

impl TryFrom<Config> for Client {
    type Error = Error;

    /// Builds a default [`Client`] from a [`Config`], see [`ClientBuilder`] if more customization is required
    fn try_from(config: Config) -> Result<Self> {
        Ok(ClientBuilder::try_from(config)?.build())
    }
}
