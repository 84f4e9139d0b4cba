//! Auth service wrapper: sign-in, registration and session teardown.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use session::CredentialPair;
use tracing::warn;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Registration payload. The server takes the password in a `passwordHash`
/// field; hashing happens server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "passwordHash")]
    pub password: String,
    pub user_type: UserType,
}

/// Token issue response shared by login and registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub user_type: UserType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    JobSeeker,
    Employer,
    Admin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResponse {
    pub message: String,
}

pub struct AuthApi {
    client: ApiClient,
    retries: u32,
}

impl AuthApi {
    pub fn new(client: ApiClient, retries: u32) -> Self {
        Self { client, retries }
    }

    /// Signs in and installs the returned token pair into the session.
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionResponse, ApiError> {
        let response: SessionResponse = self
            .client
            .post_unauthenticated("/auth/login", request)
            .await?;
        self.install(&response)?;
        Ok(response)
    }

    /// Registers a new account and installs the returned pair.
    ///
    /// Concurrent-modification conflicts (409) and throttling (429) are
    /// retried with a doubling delay, up to the configured retry budget.
    pub async fn signup(&self, request: &SignupRequest) -> Result<SessionResponse, ApiError> {
        let attempts = self.retries.max(1);
        let mut delay = Duration::from_millis(500);
        let mut attempt = 1;

        loop {
            match self
                .client
                .post_unauthenticated::<SessionResponse, _>("/auth/register", request)
                .await
            {
                Ok(response) => {
                    self.install(&response)?;
                    return Ok(response);
                }
                Err(e) if attempt < attempts && is_retryable(&e) => {
                    warn!(
                        "signup attempt {} failed, retrying in {}ms: {}",
                        attempt,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Tells the server to revoke the session, then drops it locally. Local
    /// teardown happens even when the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(e) = self.client.post_unit("/auth/logout", &serde_json::json!({})).await {
            warn!("server-side logout failed: {}", e);
        }
        self.client.session().sign_out()?;
        Ok(())
    }

    /// The currently signed-in user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me", Vec::new()).await
    }

    /// Confirms an email address with the token from the verification link.
    pub async fn verify_email(&self, token: &str) -> Result<VerificationResponse, ApiError> {
        self.client
            .post_unauthenticated("/auth/verify-email", &serde_json::json!({ "token": token }))
            .await
    }

    /// Asks for the verification email to be sent again.
    pub async fn resend_verification(&self, email: &str) -> Result<VerificationResponse, ApiError> {
        self.client
            .post_unauthenticated(
                "/auth/resend-verification",
                &serde_json::json!({ "email": email }),
            )
            .await
    }

    fn install(&self, response: &SessionResponse) -> Result<(), ApiError> {
        let pair = CredentialPair::new(&response.access_token, &response.refresh_token);
        self.client.session().sign_in(&pair)?;
        Ok(())
    }
}

fn is_retryable(error: &ApiError) -> bool {
    matches!(error, ApiError::Status { status: 409 | 429, .. })
}
