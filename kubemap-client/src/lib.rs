//! Crate for resolving Kubernetes and OpenShift kinds to the endpoints that serve them
//!
//! This crate holds the discovery [`Client`] and the [`TypeMapper`] built on top of it.
//! The mapper asks the apiserver which groups, versions and resources it serves,
//! and then answers which endpoint handles a given `apiVersion` and `kind`.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubemap_client::{Client, Config, TypeMapper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Read the cluster url from KUBEMAP_CLUSTER_URL
//!     let client = Client::try_from(Config::from_env()?)?;
//!     let mapper = TypeMapper::new(client);
//!
//!     // A bare version is looked up in /api first, then in /oapi
//!     let pods = mapper.endpoint_for("v1", "Pod").await?;
//!     println!("{} (namespaced: {})", pods.path(), pods.namespaced());
//!     if pods.supports("log") {
//!         println!("logs are served at {}/<name>/log", pods.path());
//!     }
//!
//!     // A qualified version is only looked up under /apis
//!     if !mapper.is_supported("route.openshift.io/v1", "Route").await? {
//!         println!("not an openshift cluster");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For more details, see:
//!
//! - [`Client`](crate::client) for the discovery client and its middleware
//! - [`Config`](crate::config) for the cluster url and transport timeouts
//! - [`TypeMapper`](crate::discovery) for discovery and endpoint resolution
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;

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

pub use kubemap_core as core;
