use super::credentials::AccessToken;
use super::training::TrainingService;
use crate::core::config::TrainerConfig;
use crate::core::error::{TrainerError, TrainerResult};
use crate::core::model::{JobResponse, JobSpec};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

/// Client for the Cloud ML Engine `projects.jobs` REST resource.
pub struct CloudMlService {
    client: Client,
    base_url: String,
    token: AccessToken,
}

impl CloudMlService {
    pub fn new(config: &TrainerConfig, token: AccessToken) -> TrainerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TrainerError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, token, client))
    }

    pub fn with_client(config: &TrainerConfig, token: AccessToken, client: Client) -> Self {
        Self {
            client,
            base_url: config.ml_api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn handle_response(&self, what: &str, response: Response) -> TrainerResult<JobResponse> {
        let status = response.status();
        if status.is_success() {
            let job: JobResponse = response.json().await?;
            info!("{} succeeded for {} (state {})", what, job.job_id, job.state);
            debug!("Response: {:?}", job);
            return Ok(job);
        }
        Err(Self::error_from(what, status, response).await)
    }

    async fn error_from(what: &str, status: StatusCode, response: Response) -> TrainerError {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("{} failed with status {}: {}", what, status, error_text);
        if status == StatusCode::NOT_FOUND {
            TrainerError::NotFound(format!("{}: {}", what, error_text))
        } else {
            TrainerError::Transport(format!("{} failed with status {}: {}", what, status, error_text))
        }
    }
}

#[async_trait]
impl TrainingService for CloudMlService {
    async fn create_job(&self, parent: &str, job: &JobSpec) -> TrainerResult<JobResponse> {
        let url = self.url(&format!("{}/jobs", parent));
        debug!("Creating job {} under {}", job.job_id, parent);
        let response = self
            .client
            .post(&url)
            .headers(self.token.headers()?)
            .json(job)
            .send()
            .await?;
        self.handle_response("Job creation", response).await
    }

    async fn get_job(&self, job_name: &str) -> TrainerResult<JobResponse> {
        let response = self
            .client
            .get(self.url(job_name))
            .headers(self.token.headers()?)
            .send()
            .await?;
        self.handle_response("Job status request", response).await
    }

    async fn cancel_job(&self, job_name: &str) -> TrainerResult<()> {
        let url = self.url(&format!("{}:cancel", job_name));
        let response = self
            .client
            .post(&url)
            .headers(self.token.headers()?)
            .json(&json!({}))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            info!("Cancellation requested for {}", job_name);
            return Ok(());
        }
        Err(Self::error_from("Job cancellation", status, response).await)
    }
}
