//! A uniform view over legacy and named api groups
use serde::Serialize;

use crate::{
    discovery::{ApiGroupInfo, ApiVersions},
    ApiPrefix, Error, Result,
};

/// Describes one api group found during discovery.
///
/// Legacy groups (`/api`, `/oapi`) have no name and list their versions as bare strings.
/// Named groups live under `/apis/<name>` and list structured version entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ApiGroup {
    /// An ungrouped api family served directly under a legacy prefix
    Legacy {
        /// The legacy prefix
        prefix: ApiPrefix,
        /// Served versions in server order
        versions: Vec<String>,
    },
    /// A named group served under `/apis`
    Named {
        /// Group name, e.g. `apps`
        name: String,
        /// Served versions in server order
        versions: Vec<String>,
        /// Preferred version if exported by the group
        preferred: Option<String>,
    },
}

impl ApiGroup {
    /// Version assumed preferred for every legacy group
    pub const LEGACY_PREFERRED_VERSION: &'static str = "v1";

    /// Builds a legacy group from the versions document served at its prefix
    pub fn legacy(prefix: ApiPrefix, doc: ApiVersions) -> Result<Self> {
        if !prefix.is_legacy() {
            return Err(Error::NotLegacyPrefix(prefix));
        }
        Ok(Self::Legacy {
            prefix,
            versions: doc.versions,
        })
    }

    /// Builds a named group from its entry in the `/apis` group list
    pub fn named(info: ApiGroupInfo) -> Self {
        Self::Named {
            name: info.name,
            versions: info.versions.into_iter().map(|v| v.version).collect(),
            preferred: info.preferred_version.map(|v| v.version),
        }
    }

    /// The path root this group is served under
    pub fn prefix(&self) -> ApiPrefix {
        match self {
            Self::Legacy { prefix, .. } => *prefix,
            Self::Named { .. } => ApiPrefix::Groups,
        }
    }

    /// Name of the group, `None` for legacy groups
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Legacy { .. } => None,
            Self::Named { name, .. } => Some(name),
        }
    }

    /// Served versions in the order the server listed them
    pub fn versions(&self) -> &[String] {
        match self {
            Self::Legacy { versions, .. } | Self::Named { versions, .. } => versions,
        }
    }

    /// Preferred version of the group.
    ///
    /// Legacy groups always prefer [`ApiGroup::LEGACY_PREFERRED_VERSION`];
    /// named groups prefer what the server advertised, if anything.
    pub fn preferred_version(&self) -> Option<&str> {
        match self {
            Self::Legacy { .. } => Some(Self::LEGACY_PREFERRED_VERSION),
            Self::Named { preferred, .. } => preferred.as_deref(),
        }
    }

    /// Path of the group without a version, e.g. `api` or `apis/apps`
    pub fn path(&self) -> String {
        match self {
            Self::Legacy { prefix, .. } => prefix.to_string(),
            Self::Named { name, .. } => format!("{}/{}", ApiPrefix::Groups, name),
        }
    }

    /// Path of the resource list at `version`, e.g. `apis/apps/v1`.
    ///
    /// The version is not checked against [`ApiGroup::versions`].
    pub fn path_for(&self, version: &str) -> String {
        format!("{}/{}", self.path(), version)
    }
}
