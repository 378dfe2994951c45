//! The endpoint registry and the lookup from `(apiVersion, kind)` to an endpoint
use std::collections::HashMap;

use crate::{
    discovery::{to_plural, ApiResourceEntry, ApiResourceList},
    ApiGroup, ApiPrefix, Error, ResourceKey, Result, VersionedApiResource,
};

/// Default versions substituted for each legacy prefix when a lookup carries no version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredVersions(HashMap<ApiPrefix, String>);

impl Default for PreferredVersions {
    fn default() -> Self {
        let map = ApiPrefix::LEGACY
            .iter()
            .map(|prefix| (*prefix, ApiGroup::LEGACY_PREFERRED_VERSION.to_string()))
            .collect();
        Self(map)
    }
}

impl PreferredVersions {
    /// Overrides the default version of a legacy prefix.
    ///
    /// Fails for `apis`, which has no default version, and for a blank version.
    pub fn with(mut self, prefix: ApiPrefix, version: impl Into<String>) -> Result<Self> {
        if !prefix.is_legacy() {
            return Err(Error::NotLegacyPrefix(prefix));
        }
        let version = version.into().trim().to_string();
        if version.is_empty() {
            return Err(Error::EmptyVersion);
        }
        self.0.insert(prefix, version);
        Ok(self)
    }

    /// The default version for `prefix`
    pub fn get(&self, prefix: ApiPrefix) -> Option<&str> {
        self.0.get(&prefix).map(String::as_str)
    }
}

/// Deduplicated, ordered set of discovered endpoints.
///
/// Built once through a [`RegistryBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: Vec<VersionedApiResource>,
    index: HashMap<ResourceKey, usize>,
}

impl Registry {
    /// Start collecting endpoints
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The stored endpoint with the same identity as `key`
    pub fn get(&self, key: &ResourceKey) -> Option<&VersionedApiResource> {
        self.index.get(key).map(|&i| &self.endpoints[i])
    }

    /// Whether an endpoint with the identity `key` is registered
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }

    /// All endpoints in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &VersionedApiResource> {
        self.endpoints.iter()
    }

    /// Number of registered endpoints
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Resolves an `apiVersion` and `kind` to a registered endpoint.
    ///
    /// - a blank version is looked up in every legacy prefix at that prefix's preferred version
    /// - a bare version such as `v1` is looked up in every legacy prefix at that version
    /// - a qualified version such as `apps/v1` is only looked up under `apis`
    ///
    /// Legacy prefixes are tried in [`ApiPrefix::LEGACY`] order and the first hit wins.
    /// The kind may also be given as its plural resource name, e.g. `deployments`.
    /// Returns `Ok(None)` when nothing matches.
    pub fn resolve(
        &self,
        version: &str,
        kind: &str,
        preferred: &PreferredVersions,
    ) -> Result<Option<&VersionedApiResource>> {
        let version = version.trim().trim_end_matches('/');
        // kinds given in their plural form are looked up as they are
        let plural = to_plural(kind);
        let lowered = kind.trim().to_ascii_lowercase();
        let mut names = vec![plural.as_str()];
        if lowered != plural {
            names.push(lowered.as_str());
        }
        let tokens = if version.is_empty() {
            0
        } else {
            version.split('/').count()
        };

        if tokens > 1 {
            for name in &names {
                let key = ResourceKey::new(ApiPrefix::Groups, version, *name)?;
                if let Some(found) = self.get(&key) {
                    return Ok(Some(found));
                }
            }
            return Ok(None);
        }
        for prefix in ApiPrefix::LEGACY {
            let version = if tokens == 0 {
                match preferred.get(prefix) {
                    Some(v) => v,
                    None => continue,
                }
            } else {
                version
            };
            for name in &names {
                let key = ResourceKey::with_group(prefix, None, version, *name)?;
                if let Some(found) = self.get(&key) {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type IntoIter = std::slice::Iter<'a, VersionedApiResource>;
    type Item = &'a VersionedApiResource;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}

/// Accumulates discovered resources into a [`Registry`].
///
/// Subresource entries such as `pods/log` are folded into their parent entry as capabilities.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    endpoints: Vec<VersionedApiResource>,
    index: HashMap<ResourceKey, usize>,
}

impl RegistryBuilder {
    /// Adds every entry of a resource list served by `group` at `version`
    pub fn add_resources(&mut self, group: &ApiGroup, version: &str, list: &ApiResourceList) -> Result<()> {
        for entry in &list.resources {
            self.add_resource(group, version, entry)?;
        }
        Ok(())
    }

    /// Adds a single resource entry served by `group` at `version`.
    ///
    /// The first entry seen for an identity decides its kind and scope.
    pub fn add_resource(&mut self, group: &ApiGroup, version: &str, entry: &ApiResourceEntry) -> Result<()> {
        let (name, capability) = entry.split_name();
        let key = ResourceKey::with_group(group.prefix(), group.name().map(String::from), version, name)?;
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                tracing::trace!(endpoint = %key, kind = entry.kind.as_str(), "registering endpoint");
                let i = self.endpoints.len();
                self.index.insert(key.clone(), i);
                self.endpoints
                    .push(VersionedApiResource::new(key, entry.kind.as_str(), entry.namespaced));
                i
            }
        };
        if let Some(capability) = capability {
            self.endpoints[i].add_capability(capability);
        }
        Ok(())
    }

    /// Freezes the collected endpoints
    pub fn build(self) -> Registry {
        Registry {
            endpoints: self.endpoints,
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ApiGroupInfo, ApiVersions, GroupVersionForDiscovery};

    fn entry(name: &str, kind: &str, namespaced: bool) -> ApiResourceEntry {
        ApiResourceEntry {
            name: name.into(),
            kind: kind.into(),
            namespaced,
        }
    }

    fn legacy(prefix: ApiPrefix, versions: &[&str]) -> ApiGroup {
        let doc = ApiVersions {
            versions: versions.iter().map(|v| v.to_string()).collect(),
        };
        ApiGroup::legacy(prefix, doc).unwrap()
    }

    fn named(name: &str, version: &str) -> ApiGroup {
        ApiGroup::named(ApiGroupInfo {
            name: name.into(),
            versions: vec![GroupVersionForDiscovery {
                group_version: format!("{name}/{version}"),
                version: version.into(),
            }],
            preferred_version: None,
        })
    }

    fn resolve<'a>(registry: &'a Registry, version: &str, kind: &str) -> Option<&'a VersionedApiResource> {
        registry
            .resolve(version, kind, &PreferredVersions::default())
            .unwrap()
    }

    #[test]
    fn capabilities_merge_into_one_entry() {
        let kube = legacy(ApiPrefix::Kube, &["v1"]);
        let mut builder = Registry::builder();
        builder
            .add_resource(&kube, "v1", &entry("pods/log", "Pod", true))
            .unwrap();
        builder.add_resource(&kube, "v1", &entry("pods", "Pod", true)).unwrap();
        builder
            .add_resource(&kube, "v1", &entry("pods/exec", "PodExecOptions", true))
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.len(), 1);
        let pods = resolve(&registry, "v1", "Pod").unwrap();
        assert_eq!(pods.name(), "pods");
        assert_eq!(pods.kind(), "Pod");
        assert!(pods.namespaced());
        assert!(pods.supports("log"));
        assert!(pods.supports("exec"));
        assert!(!pods.supports("status"));
    }

    #[test]
    fn same_name_in_different_groups_is_not_merged() {
        let mut builder = Registry::builder();
        let list = ApiResourceList {
            group_version: String::new(),
            resources: vec![entry("deployments", "Deployment", true)],
        };
        builder.add_resources(&named("apps", "v1"), "v1", &list).unwrap();
        builder.add_resources(&named("extensions", "v1"), "v1", &list).unwrap();
        builder
            .add_resources(&legacy(ApiPrefix::OpenShift, &["v1"]), "v1", &list)
            .unwrap();
        assert_eq!(builder.build().len(), 3);
    }

    #[test]
    fn bare_version_prefers_kube_over_openshift() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&legacy(ApiPrefix::OpenShift, &["v1"]), "v1", &entry("builds", "Build", true))
            .unwrap();
        builder
            .add_resource(&legacy(ApiPrefix::Kube, &["v1"]), "v1", &entry("builds", "Build", true))
            .unwrap();
        let registry = builder.build();

        let found = resolve(&registry, "v1", "Build").unwrap();
        assert_eq!(found.prefix(), ApiPrefix::Kube);
    }

    #[test]
    fn bare_version_falls_through_to_openshift() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&legacy(ApiPrefix::OpenShift, &["v1"]), "v1", &entry("routes", "Route", true))
            .unwrap();
        let registry = builder.build();

        let found = resolve(&registry, "v1", "Route").unwrap();
        assert_eq!(found.prefix(), ApiPrefix::OpenShift);
        assert_eq!(found.path(), "/oapi/v1/routes");
    }

    #[test]
    fn blank_version_uses_preferred_versions() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&legacy(ApiPrefix::OpenShift, &["v1"]), "v1", &entry("builds", "Build", true))
            .unwrap();
        let registry = builder.build();

        let blank = resolve(&registry, "", "Build").unwrap();
        assert_eq!(blank, resolve(&registry, "v1", "Build").unwrap());
        assert_eq!(resolve(&registry, "   ", "Build"), Some(blank));

        let preferred = PreferredVersions::default().with(ApiPrefix::OpenShift, "v2").unwrap();
        assert!(registry.resolve("", "Build", &preferred).unwrap().is_none());
    }

    #[test]
    fn qualified_version_never_consults_legacy() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&legacy(ApiPrefix::Kube, &["v1"]), "v1", &entry("deployments", "Deployment", true))
            .unwrap();
        let registry = builder.build();

        assert!(resolve(&registry, "apps/v1", "Deployment").is_none());
        assert!(resolve(&registry, "v1", "Deployment").is_some());
    }

    #[test]
    fn bare_version_never_consults_named_groups() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&named("apps", "v1"), "v1", &entry("deployments", "Deployment", true))
            .unwrap();
        let registry = builder.build();

        let found = resolve(&registry, "apps/v1", "Deployment").unwrap();
        assert_eq!(found.group(), Some("apps"));
        assert_eq!(found.kind(), "Deployment");
        assert!(resolve(&registry, "v1", "Deployment").is_none());
        assert!(resolve(&registry, "", "Deployment").is_none());
    }

    #[test]
    fn lookup_returns_the_stored_entry() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&named("apps", "v1"), "v1", &entry("deployments/scale", "Scale", true))
            .unwrap();
        builder
            .add_resource(&named("apps", "v1"), "v1", &entry("deployments", "Deployment", true))
            .unwrap();
        let registry = builder.build();

        let key = ResourceKey::new(ApiPrefix::Groups, "apps/v1", "deployments").unwrap();
        let stored = registry.get(&key).unwrap();
        // first entry seen decides the kind
        assert_eq!(stored.kind(), "Scale");
        assert!(stored.namespaced());
        assert!(stored.supports("scale"));
        assert!(registry.contains(&key));
    }

    #[test]
    fn iterates_in_discovery_order() {
        let kube = legacy(ApiPrefix::Kube, &["v1"]);
        let mut builder = Registry::builder();
        for (name, kind) in [("pods", "Pod"), ("services", "Service"), ("pods/status", "Pod")] {
            builder.add_resource(&kube, "v1", &entry(name, kind, true)).unwrap();
        }
        let registry = builder.build();
        let names: Vec<_> = registry.iter().map(VersionedApiResource::name).collect();
        assert_eq!(names, ["pods", "services"]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn plural_kinds_resolve_like_singular_ones() {
        let mut builder = Registry::builder();
        builder
            .add_resource(&named("apps", "v1"), "v1", &entry("deployments", "Deployment", true))
            .unwrap();
        builder
            .add_resource(&legacy(ApiPrefix::OpenShift, &["v1"]), "v1", &entry("pods", "Pod", true))
            .unwrap();
        builder
            .add_resource(&legacy(ApiPrefix::Kube, &["v1"]), "v1", &entry("pods", "Pod", true))
            .unwrap();
        let registry = builder.build();

        let deploy = resolve(&registry, "apps/v1", "deployments").unwrap();
        assert_eq!(deploy.name(), "deployments");
        assert_eq!(Some(deploy), resolve(&registry, "apps/v1", "Deployment"));

        // legacy order still applies to plural names
        let pods = resolve(&registry, "v1", "pods").unwrap();
        assert_eq!(pods.prefix(), ApiPrefix::Kube);
        assert_eq!(resolve(&registry, "", "Pods").unwrap().prefix(), ApiPrefix::Kube);
        assert!(resolve(&registry, "v1", "deployments").is_none());
    }

    #[test]
    fn preferred_versions_only_cover_legacy_prefixes() {
        let preferred = PreferredVersions::default();
        assert_eq!(
            preferred.clone().with(ApiPrefix::Groups, "v1"),
            Err(Error::NotLegacyPrefix(ApiPrefix::Groups))
        );
        assert_eq!(preferred.clone().with(ApiPrefix::Kube, "  "), Err(Error::EmptyVersion));

        let preferred = preferred.with(ApiPrefix::Kube, " v2 ").unwrap();
        assert_eq!(preferred.get(ApiPrefix::Kube), Some("v2"));
        assert_eq!(preferred.get(ApiPrefix::OpenShift), Some("v1"));
        assert_eq!(preferred.get(ApiPrefix::Groups), None);
    }
}
