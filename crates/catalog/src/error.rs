//! Error types for the spectral catalog.

use specdex_core::EntryKind;
use thiserror::Error;

/// Errors produced while loading, refreshing or querying a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[cfg(feature = "online")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog: {reason}")]
    Invalid { reason: String },

    #[error("{name} is not a valid {kind}")]
    UnknownName { kind: EntryKind, name: String },

    #[error("online catalog refresh is disabled in this build")]
    OnlineDisabled,

    #[error("core error: {0}")]
    Core(#[from] specdex_core::Error),
}

impl CatalogError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

impl From<CatalogError> for specdex_core::Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownName { kind, name } => Self::UnknownName { kind, name },
            CatalogError::Core(e) => e,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
