//! Token types exchanged with the auth service.

use serde::{Deserialize, Serialize};

/// An access/refresh token pair.
///
/// The two values are always read and replaced together; a store never
/// exposes a pair with only one side updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Short-lived token attached to each authenticated request.
    pub access_token: String,

    /// Long-lived token used solely to obtain a new pair.
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Whether the pair can be used to refresh at all.
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }
}

/// Successful response from the token refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

impl TokenGrant {
    /// The persistable part of the grant. Expiry metadata is surfaced to
    /// callers but not stored; requests recover from expiry reactively.
    pub fn into_pair(self) -> CredentialPair {
        CredentialPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}
