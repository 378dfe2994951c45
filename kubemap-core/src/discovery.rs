//! Discovery documents served by the apiserver, and helpers to read them
use serde::{Deserialize, Serialize};

/// Versions served under a legacy prefix such as `/api` or `/oapi`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersions {
    /// Bare version strings, e.g. `["v1"]`
    #[serde(default)]
    pub versions: Vec<String>,
}

/// The list of named groups served under `/apis`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiGroupList {
    /// Served groups
    #[serde(default)]
    pub groups: Vec<ApiGroupInfo>,
}

/// One named group entry of an [`ApiGroupList`]
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroupInfo {
    /// Group name, e.g. `apps`
    pub name: String,
    /// Served versions in server order
    #[serde(default)]
    pub versions: Vec<GroupVersionForDiscovery>,
    /// The version the server recommends, if it says so
    #[serde(default)]
    pub preferred_version: Option<GroupVersionForDiscovery>,
}

/// A version entry of an [`ApiGroupInfo`]
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionForDiscovery {
    /// `group/version`, e.g. `apps/v1`
    #[serde(default)]
    pub group_version: String,
    /// Bare version, e.g. `v1`
    pub version: String,
}

/// Resources served at one group version
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    /// `group/version` (or bare version for legacy groups) of the listed resources
    #[serde(default)]
    pub group_version: String,
    /// Listed resources, subresources included as `resource/subresource`
    #[serde(default)]
    pub resources: Vec<ApiResourceEntry>,
}

/// One resource entry of an [`ApiResourceList`]
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResourceEntry {
    /// Plural name, possibly suffixed with a subresource: `pods` or `pods/log`
    pub name: String,
    /// Kind of the served object
    #[serde(default)]
    pub kind: String,
    /// Whether objects live in a namespace
    #[serde(default)]
    pub namespaced: bool,
}

impl ApiResourceEntry {
    /// Splits the entry name into the resource name and its subresource, if any.
    ///
    /// Only the first `/` separates; `pods/log` gives `("pods", Some("log"))`.
    pub fn split_name(&self) -> (&str, Option<&str>) {
        match self.name.split_once('/') {
            Some((base, capability)) => (base, Some(capability)),
            None => (self.name.as_str(), None),
        }
    }
}

/// Pluralizes a kind into the lowercase path segment of its collection.
///
/// Handles the irregular kinds served by kubernetes and openshift.
pub fn to_plural(kind: &str) -> String {
    let word = kind.to_ascii_lowercase();
    if word == "endpoints" || word == "endpointslices" {
        return word;
    } else if word == "nodemetrics" {
        return "nodes".to_owned();
    } else if word == "podmetrics" {
        return "pods".to_owned();
    }

    // Words ending in s, x, z, ch, sh will be pluralized with -es (eg. foxes).
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    // Words ending in y that are preceded by a consonant will be pluralized by
    // replacing y with -ies (eg. puppies).
    if word.ends_with('y') {
        if let Some(c) = word.chars().rev().nth(1) {
            if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                let mut chars = word.chars();
                chars.next_back();
                return format!("{}ies", chars.as_str());
            }
        }
    }

    format!("{}s", word)
}
