//! Token refresh endpoint client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::TokenGrant;
use crate::error::AuthError;

/// Refresh endpoint, relative to the auth service base URL.
const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Error payload shape used by the auth service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Exchanges a refresh token for a new token pair.
#[derive(Debug, Clone)]
pub struct RefreshClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RefreshClient {
    pub fn new(http: reqwest::Client, auth_base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", auth_base_url.trim_end_matches('/'), REFRESH_PATH),
        }
    }

    /// Calls the refresh endpoint. A non-success status means the refresh
    /// token was refused and comes back as [`AuthError::Rejected`]; network
    /// failures surface as [`AuthError::Transport`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        debug!("requesting token refresh");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => err
                    .message
                    .or(err.error)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                Err(_) if !body.trim().is_empty() => body.trim().to_string(),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
