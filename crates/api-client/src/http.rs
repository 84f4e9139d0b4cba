//! Authenticated HTTP client shared by every service wrapper.
//!
//! Wraps outbound requests with bearer-token injection and recovers from an
//! unauthorized response exactly once: the session is refreshed (coalesced
//! across concurrent callers by the [`SessionManager`]) and the original
//! request is re-issued with the new token. Everything else — success,
//! non-401 failures, transport errors — passes through untouched.

use std::sync::Arc;
use std::time::Duration;

use common::ServiceConfig;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use session::SessionManager;
use tracing::debug;

use crate::error::{extract_error_message, ApiError};

/// How a request authenticates against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Attach the stored access token and recover from 401 via refresh.
    #[default]
    Bearer,
    /// Send as-is. Login, registration and health checks use this; a 401
    /// from those endpoints is an answer, not an expired session.
    None,
}

/// Options for a single request.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub auth: AuthMode,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Client for one service endpoint.
///
/// Clients cloned from or built against the same [`SessionManager`] share
/// its credential store and refresh coalescing.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(service: &ServiceConfig, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: service.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Performs a request, recovering from a 401 at most once.
    ///
    /// The retried request re-reads the token from the store, so every
    /// caller that coalesced onto one refresh retries with the same new
    /// token. Non-401 responses are returned unmodified.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Response, ApiError> {
        let token = match options.auth {
            AuthMode::Bearer => self.session.access_token()?,
            AuthMode::None => None,
        };
        let response = self.send(&method, path, options, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || options.auth != AuthMode::Bearer {
            return Ok(response);
        }

        debug!("{} {} returned 401, refreshing session", method, path);
        match self.session.refresh().await {
            Ok(()) => {}
            Err(e) if e.is_terminal() => return Err(ApiError::SessionExpired(e)),
            Err(e) => return Err(ApiError::Refresh(e)),
        }

        let token = self.session.access_token()?;
        self.send(&method, path, options, token.as_deref()).await
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!("{} {} -> {}", method, url, response.status().as_u16());
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let options = RequestOptions {
            query,
            ..Default::default()
        };
        self.decode(Method::GET, path, &options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions {
            body: Some(serde_json::to_value(body)?),
            ..Default::default()
        };
        self.decode(Method::POST, path, &options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions {
            body: Some(serde_json::to_value(body)?),
            ..Default::default()
        };
        self.decode(Method::PUT, path, &options).await
    }

    /// POST that skips bearer auth and 401 interception.
    pub async fn post_unauthenticated<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions {
            auth: AuthMode::None,
            body: Some(serde_json::to_value(body)?),
            ..Default::default()
        };
        self.decode(Method::POST, path, &options).await
    }

    /// POST for endpoints that answer with an empty body.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let options = RequestOptions {
            body: Some(serde_json::to_value(body)?),
            ..Default::default()
        };
        let response = self.request(Method::POST, path, &options).await?;
        Self::ensure_success(Method::POST, path, response).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.request(method.clone(), path, options).await?;
        let response = Self::ensure_success(method, path, response).await?;
        Ok(response.json().await?)
    }

    async fn ensure_success(
        method: Method,
        path: &str,
        response: Response,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            method,
            path: path.to_string(),
            status: status.as_u16(),
            message: extract_error_message(status.as_u16(), &body),
        })
    }
}
