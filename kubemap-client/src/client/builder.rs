use http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::rt::TokioExecutor;

use std::time::Duration;
use tower::{util::BoxService, BoxError, Layer, Service, ServiceBuilder};
use tower_http::{
    classify::ServerErrorsFailureClass, map_response_body::MapResponseBodyLayer, trace::TraceLayer,
};
use tracing::Span;

use super::body::{self, RequestBody, ResponseBody};
use crate::{client::ConfigExt, Client, Config, Error, Result};

/// Builder for [`Client`] instances with customized [tower](`Service`) middleware.
pub struct ClientBuilder<Svc> {
    service: Svc,
}

impl<Svc> ClientBuilder<Svc> {
    /// Construct a [`ClientBuilder`] from scratch with a fully custom [`Service`] stack.
    ///
    /// Most users want [`ClientBuilder::try_from`] instead, which starts from the default stack.
    pub fn new(service: Svc) -> Self
    where
        Svc: Service<Request<RequestBody>>,
    {
        Self { service }
    }

    /// Add a [`Layer`] to the current [`Service`] stack.
    pub fn with_layer<L: Layer<Svc>>(self, layer: &L) -> ClientBuilder<L::Service> {
        ClientBuilder {
            service: layer.layer(self.service),
        }
    }

    /// Build a [`Client`] instance with the current [`Service`] stack.
    pub fn build<B>(self) -> Client
    where
        Svc: Service<Request<RequestBody>, Response = Response<B>> + Send + 'static,
        Svc::Future: Send + 'static,
        Svc::Error: Into<BoxError>,
        B: http_body::Body<Data = bytes::Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Client::new(self.service)
    }
}

/// The default service stack built from a [`Config`]
pub type GenericService = BoxService<Request<RequestBody>, Response<ResponseBody>, BoxError>;

impl TryFrom<Config> for ClientBuilder<GenericService> {
    type Error = Error;

    /// Builds a default [`ClientBuilder`] stack from a given configuration
    fn try_from(config: Config) -> Result<Self> {
        if config.cluster_url.scheme() == Some(&http::uri::Scheme::HTTPS) {
            // no tls stack is compiled in, only the http scheme works
            return Err(Error::TlsRequired);
        }

        let client: hyper_util::client::legacy::Client<_, RequestBody> =
            hyper_util::client::legacy::Builder::new(TokioExecutor::new()).build(config.timeout_connector());

        let service = ServiceBuilder::new()
            .layer(config.base_uri_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|req: &Request<RequestBody>| {
                        tracing::debug_span!(
                            "discovery",
                            path = %req.uri().path(),
                            status = tracing::field::Empty,
                        )
                    })
                    .on_request(())
                    .on_response(|res: &Response<Incoming>, latency: Duration, span: &Span| {
                        span.record("status", res.status().as_u16());
                        tracing::debug!(?latency, "discovery response");
                    })
                    .on_body_chunk(())
                    .on_eos(())
                    .on_failure(|ec: ServerErrorsFailureClass, _latency: Duration, span: &Span| match ec {
                        ServerErrorsFailureClass::StatusCode(status) => {
                            span.record("status", status.as_u16());
                            tracing::error!(%status, "discovery request failed");
                        }
                        ServerErrorsFailureClass::Error(err) => {
                            tracing::error!(%err, "discovery request failed");
                        }
                    }),
            )
            .map_err(BoxError::from)
            .service(client);

        Ok(ClientBuilder::new(BoxService::new(
            MapResponseBodyLayer::new(body::boxed).layer(service),
        )))
    }
}
