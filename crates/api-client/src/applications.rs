//! Applications service wrapper: submission, tracking and employer review.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    ResumeViewed,
    InReview,
    Shortlisted,
    Interview,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    fn as_param(&self) -> &'static str {
        match self {
            Self::Applied => "APPLIED",
            Self::ResumeViewed => "RESUME_VIEWED",
            Self::InReview => "IN_REVIEW",
            Self::Shortlisted => "SHORTLISTED",
            Self::Interview => "INTERVIEW",
            Self::Offered => "OFFERED",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplication {
    pub job_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub user_id: String,
    pub job_id: u64,
    pub status: ApplicationStatus,
    pub applied_date: String,
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub withdrawn_date: Option<String>,
    #[serde(default)]
    pub withdraw_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedApplications {
    pub applications: Vec<Application>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

/// Listing filter. Employers pass a job id to review applicants for one
/// posting; job seekers list their own applications.
#[derive(Debug, Clone)]
pub struct ApplicationFilter {
    pub job_id: Option<u64>,
    pub status: Option<ApplicationStatus>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    pub descending: bool,
}

impl Default for ApplicationFilter {
    fn default() -> Self {
        Self {
            job_id: None,
            status: None,
            page: 1,
            limit: 20,
            sort_by: "createdAt".to_string(),
            descending: true,
        }
    }
}

impl ApplicationFilter {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("sortBy".to_string(), self.sort_by.clone()),
            (
                "sortOrder".to_string(),
                if self.descending { "desc" } else { "asc" }.to_string(),
            ),
        ];
        if let Some(job_id) = self.job_id {
            query.push(("jobId".to_string(), job_id.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_param().to_string()));
        }
        query
    }
}

/// Employer-side status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct ApplicationsApi {
    client: ApiClient,
}

impl ApplicationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, request: &SubmitApplication) -> Result<Application, ApiError> {
        self.client.post("/applications", request).await
    }

    pub async fn list(&self, filter: &ApplicationFilter) -> Result<PagedApplications, ApiError> {
        self.client.get("/applications", filter.to_query()).await
    }

    pub async fn details(&self, application_id: &str) -> Result<Application, ApiError> {
        self.client
            .get(&format!("/applications/{}", application_id), Vec::new())
            .await
    }

    pub async fn withdraw(
        &self,
        application_id: &str,
        reason: Option<&str>,
    ) -> Result<Application, ApiError> {
        self.client
            .put(
                &format!("/applications/{}/withdraw", application_id),
                &serde_json::json!({ "reason": reason }),
            )
            .await
    }

    pub async fn update_status(
        &self,
        application_id: &str,
        update: &StatusUpdate,
    ) -> Result<Application, ApiError> {
        self.client
            .put(&format!("/applications/{}/status", application_id), update)
            .await
    }
}
