//! Crate with types and client-less behavior for resolving Kubernetes and OpenShift API endpoints
//!
//! This crate is available as a minimal alternative to `kubemap` where a client is not available.
//! The same information here is always re-exported from `kubemap` under `kubemap::core`.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod apigroup;
pub use apigroup::ApiGroup;

pub mod discovery;

pub mod metadata;
pub use metadata::{TypeMeta, Typed};

pub mod prefix;
pub use prefix::ApiPrefix;

pub mod registry;
pub use registry::{PreferredVersions, Registry, RegistryBuilder};

pub mod resource;
pub use resource::{ResourceKey, VersionedApiResource};

mod error;
pub use error::{Error, ErrorResponse};

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
