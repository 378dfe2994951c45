//! Middleware types returned from `ConfigExt` methods.
mod base_uri;

pub use base_uri::{BaseUri, BaseUriLayer};
