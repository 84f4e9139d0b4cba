//! Service health probes.

use reqwest::Method;

use crate::http::{ApiClient, AuthMode, RequestOptions};

#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub service: String,
    pub healthy: bool,
    pub error: Option<String>,
}

/// Probes one service's `/health` endpoint without credentials.
pub(crate) async fn probe(client: &ApiClient, service: &str) -> ServiceHealth {
    let options = RequestOptions {
        auth: AuthMode::None,
        ..Default::default()
    };
    let (healthy, error) = match client.request(Method::GET, "/health", &options).await {
        Ok(response) if response.status().is_success() => (true, None),
        Ok(response) => (false, Some(format!("HTTP {}", response.status().as_u16()))),
        Err(e) => (false, Some(e.to_string())),
    };
    ServiceHealth {
        service: service.to_string(),
        healthy,
        error,
    }
}
