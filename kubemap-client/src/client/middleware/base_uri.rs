//! Resolve discovery paths against the cluster url.
use http::{uri, Request};
use tower::{Layer, Service};

/// Layer that applies [`BaseUri`] so that discovery paths such as `/apis` hit the cluster.
///
/// Any path in the cluster url is kept in front of the request path.
#[derive(Debug, Clone)]
pub struct BaseUriLayer {
    base_uri: http::Uri,
}

impl BaseUriLayer {
    /// Set base URI of requests.
    pub fn new(base_uri: http::Uri) -> Self {
        Self { base_uri }
    }
}

impl<S> Layer<S> for BaseUriLayer {
    type Service = BaseUri<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BaseUri {
            base_uri: self.base_uri.clone(),
            inner,
        }
    }
}

/// Middleware that makes every request relative to the cluster url.
#[derive(Debug, Clone)]
pub struct BaseUri<S> {
    base_uri: http::Uri,
    inner: S,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BaseUri<S>
where
    S: Service<Request<ReqBody>>,
{
    type Error = S::Error;
    type Future = S::Future;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let (mut parts, body) = req.into_parts();
        parts.uri = join(&self.base_uri, parts.uri.path_and_query());
        self.inner.call(Request::from_parts(parts, body))
    }
}

fn join(base_uri: &http::Uri, req_pandq: Option<&uri::PathAndQuery>) -> http::Uri {
    let mut parts = base_uri.clone().into_parts();
    let base_path = base_uri.path().trim_end_matches('/');
    let joined = match req_pandq {
        Some(req_pandq) => format!("{}{}", base_path, req_pandq),
        None if base_path.is_empty() => "/".to_string(),
        None => base_path.to_string(),
    };
    // a valid base path followed by a valid path and query is itself valid
    parts.path_and_query = Some(joined.parse().expect("valid path and query"));
    http::Uri::from_parts(parts).expect("valid uri")
}
