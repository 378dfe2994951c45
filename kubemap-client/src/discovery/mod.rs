//! Lazy API discovery and kind-to-endpoint resolution.
//!
//! The [`TypeMapper`] walks the discovery documents of the apiserver once,
//! on the first question it is asked, and answers every later question from the
//! resulting [`Registry`].
use kubemap_core::{ApiGroup, ApiPrefix, PreferredVersions, Registry, Typed, VersionedApiResource};
use tokio::sync::OnceCell;

use crate::{error::DiscoveryError, Client, Error, Result};

/// How the mapper decides what named api groups to scan
enum DiscoveryMode {
    /// Only allow explicitly listed apigroups
    Allow(Vec<String>),
    /// Allow all apigroups except the ones listed
    Block(Vec<String>),
}

impl DiscoveryMode {
    fn is_queryable(&self, group: &str) -> bool {
        match &self {
            Self::Allow(allowed) => allowed.iter().any(|g| g == group),
            Self::Block(blocked) => !blocked.iter().any(|g| g == group),
        }
    }
}

struct Discovered {
    groups: Vec<ApiGroup>,
    registry: Registry,
}

/// Resolves `apiVersion` and `kind` pairs to the endpoints serving them.
///
/// Discovery runs on first use:
/// - the legacy prefixes `/api` and `/oapi` are asked for their versions
/// - `/apis` is asked for its named groups
/// - every version of every group is asked for its resource list
///
/// The outcome is kept for the lifetime of the mapper and never refreshed;
/// construct a new mapper to pick up api changes.
/// Concurrent first calls share a single discovery pass.
/// A failed pass is not kept, so the next call tries again.
///
/// ```no_run
/// use kubemap_client::{Client, Config, TypeMapper};
///
/// # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::try_from(Config::from_env()?)?;
/// let mapper = TypeMapper::new(client);
/// let endpoint = mapper.endpoint_for("apps/v1", "Deployment").await?;
/// assert_eq!(endpoint.path(), "/apis/apps/v1/deployments");
/// # Ok(())
/// # }
/// ```
pub struct TypeMapper {
    client: Client,
    mode: DiscoveryMode,
    preferred: PreferredVersions,
    discovered: OnceCell<Discovered>,
}

impl TypeMapper {
    /// Construct a mapper that scans every api group
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            mode: DiscoveryMode::Block(vec![]),
            preferred: PreferredVersions::default(),
            discovered: OnceCell::new(),
        }
    }

    /// Only scan the listed named groups.
    ///
    /// Legacy groups are always scanned.
    #[must_use]
    pub fn filter(mut self, allow: &[&str]) -> Self {
        self.mode = DiscoveryMode::Allow(allow.iter().map(ToString::to_string).collect());
        self
    }

    /// Scan every named group except the listed ones.
    ///
    /// Legacy groups are always scanned.
    #[must_use]
    pub fn exclude(mut self, deny: &[&str]) -> Self {
        self.mode = DiscoveryMode::Block(deny.iter().map(ToString::to_string).collect());
        self
    }

    /// Override the version assumed for a legacy prefix when a kind is resolved without a version.
    ///
    /// Only `api` and `oapi` take an override, and the version must not be blank.
    pub fn preferred_version(mut self, prefix: ApiPrefix, version: impl Into<String>) -> Result<Self> {
        self.preferred = self.preferred.with(prefix, version)?;
        Ok(self)
    }

    /// Whether the apiserver serves the `apiVersion` and `kind` of `obj`
    pub async fn is_supported_resource(&self, obj: &impl Typed) -> Result<bool> {
        self.is_supported(obj.api_version(), obj.kind()).await
    }

    /// Whether a legacy prefix serves `kind` at its preferred version
    pub async fn is_supported_kind(&self, kind: &str) -> Result<bool> {
        self.is_supported("", kind).await
    }

    /// Whether the apiserver serves `kind` at `version`.
    ///
    /// `version` is either blank, bare like `v1`, or qualified like `apps/v1`.
    pub async fn is_supported(&self, version: &str, kind: &str) -> Result<bool> {
        let registry = self.registry().await?;
        Ok(registry.resolve(version, kind, &self.preferred)?.is_some())
    }

    /// Finds the endpoint serving `kind` at `version`.
    ///
    /// Bare and blank versions are searched in the legacy prefixes, `/api` before `/oapi`.
    /// Qualified versions are only searched under `/apis`.
    pub async fn endpoint_for(&self, version: &str, kind: &str) -> Result<&VersionedApiResource> {
        let registry = self.registry().await?;
        registry.resolve(version, kind, &self.preferred)?.ok_or_else(|| {
            Error::Discovery(DiscoveryError::MissingEndpoint {
                kind: kind.to_string(),
                version: version.to_string(),
            })
        })
    }

    /// Every discovered endpoint, in discovery order
    pub async fn endpoints(&self) -> Result<Vec<&VersionedApiResource>> {
        Ok(self.registry().await?.iter().collect())
    }

    /// Every discovered group, legacy groups first
    pub async fn groups(&self) -> Result<&[ApiGroup]> {
        Ok(&self.discovered().await?.groups)
    }

    /// The endpoint registry, running discovery if it has not completed yet
    pub async fn registry(&self) -> Result<&Registry> {
        Ok(&self.discovered().await?.registry)
    }

    async fn discovered(&self) -> Result<&Discovered> {
        self.discovered.get_or_try_init(|| self.discover()).await
    }

    async fn discover(&self) -> Result<Discovered> {
        tracing::debug!("Starting api discovery");
        let mut groups = Vec::new();
        for prefix in ApiPrefix::LEGACY {
            let versions = self.client.list_legacy_api_versions(prefix).await?;
            groups.push(ApiGroup::legacy(prefix, versions)?);
        }
        for info in self.client.list_api_groups().await?.groups {
            if self.mode.is_queryable(&info.name) {
                groups.push(ApiGroup::named(info));
            } else {
                tracing::debug!(group = info.name.as_str(), "Skipping api group");
            }
        }

        let mut builder = Registry::builder();
        for group in &groups {
            for version in group.versions() {
                let resources = self.client.list_api_resources(&group.path_for(version)).await?;
                builder.add_resources(group, version, &resources)?;
            }
        }
        let registry = builder.build();
        tracing::debug!(
            groups = groups.len(),
            endpoints = registry.len(),
            "Completed api discovery"
        );
        Ok(Discovered { groups, registry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::pin_mut;
    use http::{Request, Response, StatusCode};
    use http_body_util::Full;
    use kubemap_core::TypeMeta;
    use serde_json::json;
    use tokio::task::JoinHandle;
    use tower_test::mock;

    type Body = Full<bytes::Bytes>;
    type Handle = mock::Handle<Request<Body>, Response<Body>>;

    fn mapper() -> (TypeMapper, Handle) {
        let (mock_service, handle) = mock::pair::<Request<Body>, Response<Body>>();
        (TypeMapper::new(Client::new(mock_service)), handle)
    }

    fn json(value: serde_json::Value) -> Response<Body> {
        Response::builder()
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap()
    }

    fn status(code: StatusCode) -> Response<Body> {
        Response::builder()
            .status(code)
            .body(Body::from(format!(r#"{{"status":"Failure","message":"","reason":"","code":{}}}"#, code.as_u16()).into_bytes()))
            .unwrap()
    }

    fn legacy(versions: &[&str]) -> Response<Body> {
        json(json!({ "kind": "APIVersions", "versions": versions }))
    }

    fn groups(groups: serde_json::Value) -> Response<Body> {
        json(json!({ "kind": "APIGroupList", "groups": groups }))
    }

    fn resources(group_version: &str, resources: serde_json::Value) -> Response<Body> {
        json(json!({ "kind": "APIResourceList", "groupVersion": group_version, "resources": resources }))
    }

    fn apps_group() -> serde_json::Value {
        json!([{
            "name": "apps",
            "versions": [{ "groupVersion": "apps/v1", "version": "v1" }],
            "preferredVersion": { "groupVersion": "apps/v1", "version": "v1" }
        }])
    }

    fn pods() -> serde_json::Value {
        json!([
            { "name": "pods", "kind": "Pod", "namespaced": true },
            { "name": "pods/log", "kind": "Pod", "namespaced": true },
            { "name": "pods/exec", "kind": "PodExecOptions", "namespaced": true },
        ])
    }

    fn deployments() -> serde_json::Value {
        json!([
            { "name": "deployments", "kind": "Deployment", "namespaced": true },
            { "name": "deployments/scale", "kind": "Scale", "namespaced": true },
        ])
    }

    /// Answers the expected discovery requests in order, then checks nothing else is asked
    fn serve(handle: Handle, script: Vec<(&'static str, Response<Body>)>) -> JoinHandle<()> {
        tokio::spawn(async move {
            pin_mut!(handle);
            for (path, response) in script {
                let (request, send) = handle.next_request().await.expect("service not called");
                assert_eq!(request.method(), http::Method::GET);
                assert_eq!(request.uri().path(), path);
                send.send_response(response);
            }
            assert!(handle.next_request().await.is_none(), "unexpected discovery request");
        })
    }

    fn full_discovery() -> Vec<(&'static str, Response<Body>)> {
        vec![
            ("/api", legacy(&["v1"])),
            ("/oapi", legacy(&["v1"])),
            ("/apis", groups(apps_group())),
            ("/api/v1", resources("v1", pods())),
            (
                "/oapi/v1",
                resources(
                    "v1",
                    json!([
                        { "name": "pods", "kind": "Pod", "namespaced": true },
                        { "name": "buildconfigs", "kind": "BuildConfig", "namespaced": true },
                    ]),
                ),
            ),
            ("/apis/apps/v1", resources("apps/v1", deployments())),
        ]
    }

    #[tokio::test]
    async fn resolves_legacy_kind_with_capabilities() {
        let (mapper, handle) = mapper();
        let server = serve(handle, full_discovery());

        let pod = mapper.endpoint_for("v1", "Pod").await.unwrap();
        assert_eq!(pod.prefix(), ApiPrefix::Kube);
        assert_eq!(pod.group(), None);
        assert_eq!(pod.name(), "pods");
        assert!(pod.namespaced());
        assert!(pod.supports("log"));
        assert!(pod.supports("exec"));
        assert!(!pod.supports("attach"));

        // only served by the openshift prefix
        let bc = mapper.endpoint_for("v1", "BuildConfig").await.unwrap();
        assert_eq!(bc.prefix(), ApiPrefix::OpenShift);

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn qualified_versions_stay_in_named_groups() {
        let (mapper, handle) = mapper();
        let server = serve(handle, full_discovery());

        let deploy = mapper.endpoint_for("apps/v1", "Deployment").await.unwrap();
        assert_eq!(deploy.group(), Some("apps"));
        assert_eq!(deploy.path(), "/apis/apps/v1/deployments");
        assert!(deploy.supports("scale"));

        let err = mapper.endpoint_for("v1", "Deployment").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Error from discovery: No endpoint found for Deployment, version v1");
        assert!(!mapper.is_supported("apps/v1", "Pod").await.unwrap());

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn blank_version_uses_preferred_versions() {
        let (mapper, handle) = mapper();
        let server = serve(handle, full_discovery());

        assert!(mapper.is_supported_kind("Pod").await.unwrap());
        assert!(mapper.is_supported_kind("BuildConfig").await.unwrap());
        assert!(!mapper.is_supported_kind("Deployment").await.unwrap());
        assert!(mapper
            .is_supported_resource(&TypeMeta::new("apps/v1", "Deployment"))
            .await
            .unwrap());
        assert!(mapper
            .is_supported_resource(&json!({ "apiVersion": "v1", "kind": "Pod" }))
            .await
            .unwrap());

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn preferred_version_overrides() {
        let (mapper, handle) = mapper();
        let mapper = mapper.preferred_version(ApiPrefix::Kube, "v2").unwrap();
        let server = serve(handle, full_discovery());

        // api/v2 does not exist, the openshift prefix still serves pods at v1
        let pod = mapper.endpoint_for("", "Pod").await.unwrap();
        assert_eq!(pod.prefix(), ApiPrefix::OpenShift);
        // an explicit version ignores the preference
        let pod = mapper.endpoint_for("v1", "Pod").await.unwrap();
        assert_eq!(pod.prefix(), ApiPrefix::Kube);

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_preferred_versions_are_rejected() {
        let (grouped, _handle) = mapper();
        let err = grouped.preferred_version(ApiPrefix::Groups, "v1").err().unwrap();
        assert!(matches!(
            err,
            Error::Core(kubemap_core::Error::NotLegacyPrefix(ApiPrefix::Groups))
        ));

        let (blank, _handle) = mapper();
        let err = blank.preferred_version(ApiPrefix::OpenShift, "").err().unwrap();
        assert!(matches!(err, Error::Core(kubemap_core::Error::EmptyVersion)));
    }

    #[tokio::test]
    async fn excluded_groups_are_never_listed() {
        let (mapper, handle) = mapper();
        let mapper = mapper.exclude(&["apps"]);
        let server = serve(
            handle,
            vec![
                ("/api", legacy(&["v1"])),
                ("/oapi", legacy(&[])),
                ("/apis", groups(apps_group())),
                ("/api/v1", resources("v1", pods())),
            ],
        );

        assert!(!mapper.is_supported("apps/v1", "Deployment").await.unwrap());
        let names: Vec<_> = mapper.groups().await.unwrap().iter().map(ApiGroup::path).collect();
        assert_eq!(names, vec!["api", "oapi"]);

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn filtered_groups_are_the_only_named_ones() {
        let (mapper, handle) = mapper();
        let mapper = mapper.filter(&["batch"]);
        let server = serve(
            handle,
            vec![
                ("/api", legacy(&[])),
                ("/oapi", legacy(&[])),
                ("/apis", groups(apps_group())),
            ],
        );

        assert!(mapper.endpoints().await.unwrap().is_empty());

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_resource_list_adds_nothing() {
        let (mapper, handle) = mapper();
        let server = serve(
            handle,
            vec![
                ("/api", legacy(&["v1"])),
                ("/oapi", legacy(&["v1"])),
                ("/apis", groups(json!([]))),
                ("/api/v1", resources("v1", pods())),
                ("/oapi/v1", Response::new(Body::default())),
            ],
        );

        let endpoints = mapper.endpoints().await.unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].to_string(), "api/v1/pods");

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_discovery() {
        let (mapper, handle) = mapper();
        let server = serve(handle, full_discovery());

        let (pod, deploy, bc, missing) = tokio::join!(
            mapper.is_supported("v1", "Pod"),
            mapper.endpoint_for("apps/v1", "Deployment"),
            mapper.is_supported_kind("BuildConfig"),
            mapper.is_supported("batch/v1", "Job"),
        );
        assert!(pod.unwrap());
        assert_eq!(deploy.unwrap().name(), "deployments");
        assert!(bc.unwrap());
        assert!(!missing.unwrap());

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn failed_discovery_is_retried_by_the_next_call() {
        let (mapper, handle) = mapper();
        let mut script = vec![("/api", status(StatusCode::INTERNAL_SERVER_ERROR))];
        script.extend(full_discovery());
        let server = serve(handle, script);

        let err = mapper.is_supported("v1", "Pod").await.unwrap_err();
        assert!(matches!(err, Error::Api(ref s) if s.code == 500));
        assert!(mapper.is_supported("v1", "Pod").await.unwrap());

        drop(mapper);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn missing_legacy_prefix_fails_discovery() {
        let (mapper, handle) = mapper();
        let server = serve(
            handle,
            vec![
                ("/api", legacy(&["v1"])),
                ("/oapi", status(StatusCode::NOT_FOUND)),
            ],
        );

        let err = mapper.endpoint_for("v1", "Pod").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        drop(mapper);
        server.await.unwrap();
    }
}
