//! Type information carried by api objects
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type information that is flattened into every kubernetes object
#[derive(Deserialize, Serialize, Clone, Default, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// The version of the API
    pub api_version: String,

    /// The name of the API
    pub kind: String,
}

impl TypeMeta {
    /// Construct from an `apiVersion` and `kind`
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

/// An object that declares its own `apiVersion` and `kind`
pub trait Typed {
    /// The declared `apiVersion`, empty when absent
    fn api_version(&self) -> &str;

    /// The declared `kind`, empty when absent
    fn kind(&self) -> &str;
}

impl Typed for TypeMeta {
    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn kind(&self) -> &str {
        &self.kind
    }
}

/// Untyped json objects such as decoded manifests
impl Typed for Value {
    fn api_version(&self) -> &str {
        self.get("apiVersion").and_then(Value::as_str).unwrap_or_default()
    }

    fn kind(&self) -> &str {
        self.get("kind").and_then(Value::as_str).unwrap_or_default()
    }
}
