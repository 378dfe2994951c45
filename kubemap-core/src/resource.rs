//! Addressable resource collections and their identity
use std::{
    collections::BTreeSet,
    fmt,
    hash::{Hash, Hasher},
};

use serde::Serialize;

use crate::{ApiPrefix, Error, Result};

/// Identity of a resource collection at one api version.
///
/// Two endpoints are the same registry slot exactly when their keys are equal;
/// kind, scope and capabilities play no part in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceKey {
    prefix: ApiPrefix,
    group: Option<String>,
    version: String,
    name: String,
}

impl ResourceKey {
    /// Creates a key from a possibly group qualified version.
    ///
    /// `apps/v1` is split at the last `/` into the group `apps` and the version `v1`,
    /// while a bare `v1` leaves the group unset.
    pub fn new(prefix: ApiPrefix, version: &str, name: impl Into<String>) -> Result<Self> {
        let (group, version) = match version.rsplit_once('/') {
            Some((group, version)) => (Some(group.to_string()), version),
            None => (None, version),
        };
        Self::with_group(prefix, group, version, name)
    }

    /// Creates a key from its four parts
    pub fn with_group(
        prefix: ApiPrefix,
        group: Option<String>,
        version: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let version = version.into();
        if version.is_empty() {
            return Err(Error::EmptyVersion);
        }
        Ok(Self {
            prefix,
            group,
            version,
            name: name.into(),
        })
    }

    /// Path root of the collection
    pub fn prefix(&self) -> ApiPrefix {
        self.prefix
    }

    /// Api group name, `None` for legacy groups
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Bare version, e.g. `v1`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Plural name of the collection, e.g. `pods`
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}/{}/{}/{}", self.prefix, group, self.version, self.name),
            None => write!(f, "{}/{}/{}", self.prefix, self.version, self.name),
        }
    }
}

/// A resolved endpoint: one resource collection served at one api version.
///
/// Equality and hashing only consider the [`ResourceKey`].
#[derive(Debug, Clone, Serialize)]
pub struct VersionedApiResource {
    #[serde(flatten)]
    key: ResourceKey,
    kind: String,
    namespaced: bool,
    capabilities: BTreeSet<String>,
}

impl VersionedApiResource {
    pub(crate) fn new(key: ResourceKey, kind: impl Into<String>, namespaced: bool) -> Self {
        Self {
            key,
            kind: kind.into(),
            namespaced,
            capabilities: BTreeSet::new(),
        }
    }

    // only reachable through RegistryBuilder, before the entry is handed out
    pub(crate) fn add_capability(&mut self, capability: impl Into<String>) {
        self.capabilities.insert(capability.into());
    }

    /// The identity of this endpoint
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Path root of the collection
    pub fn prefix(&self) -> ApiPrefix {
        self.key.prefix
    }

    /// Api group name, `None` for legacy groups
    pub fn group(&self) -> Option<&str> {
        self.key.group()
    }

    /// Bare version, e.g. `v1`
    pub fn version(&self) -> &str {
        self.key.version()
    }

    /// Plural name of the collection, e.g. `pods`
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Kind of the served objects
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether objects of this collection live in a namespace
    pub fn namespaced(&self) -> bool {
        self.namespaced
    }

    /// Checks whether `capability` (a subresource such as `log` or `scale`) is served
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// Served capabilities in lexical order
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }

    /// The `apiVersion` objects of this collection carry, e.g. `v1` or `apps/v1`
    pub fn api_version(&self) -> String {
        match self.group() {
            Some(group) => format!("{}/{}", group, self.version()),
            None => self.version().to_string(),
        }
    }

    /// Absolute path of the collection, e.g. `/api/v1/pods` or `/apis/apps/v1/deployments`
    pub fn path(&self) -> String {
        format!("/{}", self.key)
    }
}

impl PartialEq for VersionedApiResource {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for VersionedApiResource {}

impl Hash for VersionedApiResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}

impl fmt::Display for VersionedApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
