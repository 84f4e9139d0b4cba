//! Error types for credential storage and refresh.
//!
//! Both enums are `Clone`: a single refresh outcome is shared by every caller
//! that coalesced onto it, so the error must be handed out more than once.
//! Non-cloneable sources are wrapped in `Arc`.

use std::sync::Arc;

use thiserror::Error;

/// Credential store failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("could not determine config directory for this platform")]
    NoConfigDir,
    #[error("credential store io error: {0}")]
    Io(Arc<std::io::Error>),
    #[error("credential store has unreadable contents: {0}")]
    Parse(Arc<serde_json::Error>),
    #[error("keyring error: {0}")]
    Keyring(String),
}

impl From<std::io::Error> for StoreError {
    fn from(source: std::io::Error) -> Self {
        Self::Io(Arc::new(source))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse(Arc::new(source))
    }
}

/// Refresh failures, split by whether they end the session.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Network-level failure while calling the refresh endpoint. The stored
    /// pair may still be valid; a later refresh can succeed.
    #[error("transport error during token refresh: {0}")]
    Transport(Arc<reqwest::Error>),

    /// No refresh token is stored; there is nothing to refresh with.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint refused the refresh token.
    #[error("token refresh rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for AuthError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport(Arc::new(source))
    }
}

impl AuthError {
    /// Terminal failures end the session: the store is purged and the user
    /// must sign in again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthError::MissingRefreshToken | AuthError::Rejected { .. }
        )
    }
}
