//! Jobs service wrapper: search, discovery and saved jobs.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    fn as_param(&self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Freelance => "freelance",
            Self::Internship => "internship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    fn as_param(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Recent,
    Salary,
    Relevance,
}

impl SortBy {
    fn as_param(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Salary => "salary",
            Self::Relevance => "relevance",
        }
    }
}

/// Search filters. Unset filters are omitted from the query string.
#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    pub search: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub skills: Vec<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortBy>,
}

impl JobSearch {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(location) = &self.location {
            query.push(("location".to_string(), location.clone()));
        }
        if let Some(salary_min) = self.salary_min {
            query.push(("salaryMin".to_string(), salary_min.to_string()));
        }
        if let Some(salary_max) = self.salary_max {
            query.push(("salaryMax".to_string(), salary_max.to_string()));
        }
        if let Some(job_type) = self.job_type {
            query.push(("jobType".to_string(), job_type.as_param().to_string()));
        }
        if let Some(level) = self.experience_level {
            query.push(("experienceLevel".to_string(), level.as_param().to_string()));
        }
        if let Some(company) = &self.company {
            query.push(("company".to_string(), company.clone()));
        }
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if !self.skills.is_empty() {
            query.push(("skills".to_string(), self.skills.join(",")));
        }
        query.push(("page".to_string(), self.page.unwrap_or(1).to_string()));
        query.push(("limit".to_string(), self.limit.unwrap_or(10).to_string()));
        if let Some(sort_by) = self.sort_by {
            query.push(("sortBy".to_string(), sort_by.as_param().to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Display form of the employment type ("Full-time", "Contract", ...).
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub posted: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchResponse {
    pub jobs: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub job: Job,
    #[serde(default)]
    pub similar_jobs: Vec<Job>,
    #[serde(default)]
    pub application_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveJobResponse {
    pub success: bool,
}

pub struct JobsApi {
    client: ApiClient,
}

impl JobsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Paged search across job postings.
    pub async fn search(&self, params: &JobSearch) -> Result<JobSearchResponse, ApiError> {
        self.client.get("/jobs", params.to_query()).await
    }

    /// One posting with its similar jobs and applicant count.
    pub async fn details(&self, job_id: u64) -> Result<JobDetails, ApiError> {
        self.client.get(&format!("/jobs/{}", job_id), Vec::new()).await
    }

    pub async fn similar(&self, job_id: u64, limit: u32) -> Result<Vec<Job>, ApiError> {
        self.client
            .get(
                &format!("/jobs/{}/similar", job_id),
                vec![("limit".to_string(), limit.to_string())],
            )
            .await
    }

    pub async fn trending(&self, limit: u32) -> Result<Vec<Job>, ApiError> {
        self.client
            .get(
                "/jobs/trending",
                vec![("limit".to_string(), limit.to_string())],
            )
            .await
    }

    /// Postings picked from the user's profile and activity.
    pub async fn recommendations(&self, limit: u32) -> Result<Vec<Job>, ApiError> {
        self.client
            .get(
                "/jobs/recommendations",
                vec![("limit".to_string(), limit.to_string())],
            )
            .await
    }

    pub async fn save(&self, job_id: u64) -> Result<SaveJobResponse, ApiError> {
        self.client
            .post(&format!("/jobs/{}/save", job_id), &serde_json::json!({}))
            .await
    }

    pub async fn unsave(&self, job_id: u64) -> Result<SaveJobResponse, ApiError> {
        self.client
            .post(&format!("/jobs/{}/unsave", job_id), &serde_json::json!({}))
            .await
    }
}
