//! Construction of the per-service clients.
//!
//! All clients share one [`SessionManager`], so the single-refresh-in-flight
//! guarantee holds across services, not just within one of them.

use std::sync::Arc;
use std::time::Duration;

use common::Config;
use session::{CredentialStore, RefreshClient, SessionManager};

use crate::applications::ApplicationsApi;
use crate::auth::AuthApi;
use crate::error::ApiError;
use crate::health::{probe, ServiceHealth};
use crate::http::ApiClient;
use crate::jobs::JobsApi;
use crate::profile::ProfileApi;

pub struct ServiceClients {
    pub auth: AuthApi,
    pub jobs: JobsApi,
    pub applications: ApplicationsApi,
    pub profile: ProfileApi,
    session: Arc<SessionManager>,
    probes: [(&'static str, ApiClient); 4],
}

impl ServiceClients {
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let refresh_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.auth.timeout_secs))
            .build()?;
        let refresher = RefreshClient::new(refresh_http, &config.auth.base_url);
        let session = Arc::new(SessionManager::new(store, refresher));

        let auth_client = ApiClient::new(&config.auth, session.clone())?;
        let jobs_client = ApiClient::new(&config.jobs, session.clone())?;
        let applications_client = ApiClient::new(&config.applications, session.clone())?;
        let profile_client = ApiClient::new(&config.profile, session.clone())?;

        Ok(Self {
            probes: [
                ("auth", auth_client.clone()),
                ("jobs", jobs_client.clone()),
                ("applications", applications_client.clone()),
                ("profile", profile_client.clone()),
            ],
            auth: AuthApi::new(auth_client, config.auth.retries),
            jobs: JobsApi::new(jobs_client),
            applications: ApplicationsApi::new(applications_client),
            profile: ProfileApi::new(profile_client),
            session,
        })
    }

    /// The shared session; useful for inspecting sign-in state.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Probes every configured service concurrently.
    pub async fn health(&self) -> Vec<ServiceHealth> {
        let [(auth_name, auth), (jobs_name, jobs), (apps_name, apps), (profile_name, profile)] =
            &self.probes;
        let (a, j, ap, p) = tokio::join!(
            probe(auth, auth_name),
            probe(jobs, jobs_name),
            probe(apps, apps_name),
            probe(profile, profile_name),
        );
        vec![a, j, ap, p]
    }
}
