//! Error types for configuration and sync runs.

use seosync_store::StoreError;
use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid origin `{origin}`: {reason}")]
    InvalidOrigin {
        origin: String,
        reason: &'static str,
    },

    #[error("invalid allow-list entry: {0}")]
    InvalidAllowListKey(#[from] crate::page_key::InvalidPageKey),

    #[error("binding must be a JavaScript identifier, got `{0}`")]
    InvalidBinding(String),
}

/// Errors that abort a sync run. All of them occur before the store is
/// written.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An input file is missing or unreadable.
    #[error("failed to read {label} at {}: {source}", path.display())]
    Read {
        label: &'static str,
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// The store could not be parsed or rewritten.
    #[error("{}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    /// Whether the failure was locating the store's object literal.
    pub fn is_anchor_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store {
                source: StoreError::AnchorNotFound { .. } | StoreError::Unterminated { .. },
                ..
            }
        )
    }
}
