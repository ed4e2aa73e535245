//! Error types for the Gridwork plugin API.

use thiserror::Error;

use crate::getters::GetterError;
use crate::resolver::ResolveError;

/// Errors surfaced by the plugin host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host has no successfully mounted plugin set.
    #[error("Plugin host is not mounted")]
    NotMounted,

    /// Dependency resolution failed; the mount was aborted.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Getter resolution failed.
    #[error(transparent)]
    Getter(#[from] GetterError),
}

/// Result alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
