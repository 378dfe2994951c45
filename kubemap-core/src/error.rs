use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prefix::ApiPrefix;

/// Possible errors when building or resolving endpoints without a client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A resource key was constructed without a version
    #[error("version can not be empty when creating a resource key")]
    EmptyVersion,

    /// A legacy group was constructed from a non-legacy prefix
    #[error("{0} is not a legacy api prefix")]
    NotLegacyPrefix(ApiPrefix),

    /// A string did not name any known api prefix
    #[error("unknown api prefix: {0}")]
    UnknownPrefix(String),
}

/// An error response from the API.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{message}: {reason}")]
pub struct ErrorResponse {
    /// The status
    pub status: String,
    /// A message about the error
    #[serde(default)]
    pub message: String,
    /// The reason for the error
    #[serde(default)]
    pub reason: String,
    /// The error code
    pub code: u16,
}

impl ErrorResponse {
    /// Whether the apiserver reported the requested path as missing
    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }
}
