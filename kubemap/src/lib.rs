//! Kubernetes and OpenShift api discovery for Rust
//!
//! This crate answers one question for callers holding an `apiVersion` and a `kind`:
//! which endpoint of the cluster serves it.
//! It does so by walking the discovery documents of the apiserver once,
//! and resolving every later question from memory.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubemap::{Client, Config, TypeMapper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kubemap::Error> {
//!     let client = Client::try_from(Config::from_cluster_url("http://127.0.0.1:8080")?)?;
//!     let mapper = TypeMapper::new(client).exclude(&["metrics.k8s.io"]);
//!
//!     let deployments = mapper.endpoint_for("apps/v1", "Deployment").await?;
//!     assert_eq!(deployments.path(), "/apis/apps/v1/deployments");
//!
//!     // legacy kinds are looked up in /api, then in /oapi
//!     for kind in ["Pod", "BuildConfig"] {
//!         println!("{kind}: {}", mapper.is_supported_kind(kind).await?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - [`core`] holds the client-less types: [`ApiGroup`](core::ApiGroup),
//!   [`VersionedApiResource`](core::VersionedApiResource) and the [`Registry`](core::Registry)
//!   that resolution runs against
//! - the `client` feature adds the discovery [`Client`] and the [`TypeMapper`]
#![cfg_attr(docsrs, feature(doc_cfg))]

macro_rules! cfg_client {
    ($($item:item)*) => {
        $(
            #[cfg_attr(docsrs, doc(cfg(feature = "client")))]
            #[cfg(feature = "client")]
            $item
        )*
    }
}

cfg_client! {
    pub use kubemap_client::client;
    pub use kubemap_client::config;
    pub use kubemap_client::discovery;
    pub use kubemap_client::error;

    #[doc(inline)]
    pub use client::Client;
    #[doc(inline)]
    pub use config::Config;
    #[doc(inline)]
    pub use discovery::TypeMapper;
    #[doc(inline)]
    pub use error::Error;

    /// Convient alias for `Result<T, Error>`
    pub type Result<T, E = Error> = std::result::Result<T, E>;
}

pub use crate::core::{ApiGroup, ApiPrefix, Typed, VersionedApiResource};
#[doc(inline)]
pub use kubemap_core as core;
