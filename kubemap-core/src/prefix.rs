//! Path roots that an apiserver serves its apis under
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The root path segment of an api family.
///
/// Kubernetes serves its core group under `api` and every named group under `apis`.
/// OpenShift 3.x additionally served its own ungrouped types under `oapi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiPrefix {
    /// `api`, the legacy kubernetes core group
    #[serde(rename = "api")]
    Kube,
    /// `oapi`, the legacy openshift group
    #[serde(rename = "oapi")]
    OpenShift,
    /// `apis`, the root of all named api groups
    #[serde(rename = "apis")]
    Groups,
}

impl ApiPrefix {
    /// Legacy prefixes, in the order bare versions are resolved against them.
    ///
    /// When both families serve the same plural at the same version,
    /// the kubernetes entry wins.
    pub const LEGACY: [ApiPrefix; 2] = [ApiPrefix::Kube, ApiPrefix::OpenShift];

    /// The path segment of this prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kube => "api",
            Self::OpenShift => "oapi",
            Self::Groups => "apis",
        }
    }

    /// Whether this prefix serves an ungrouped legacy api family
    pub fn is_legacy(&self) -> bool {
        !matches!(self, Self::Groups)
    }
}

impl fmt::Display for ApiPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches('/') {
            "api" => Ok(Self::Kube),
            "oapi" => Ok(Self::OpenShift),
            "apis" => Ok(Self::Groups),
            other => Err(Error::UnknownPrefix(other.to_string())),
        }
    }
}
