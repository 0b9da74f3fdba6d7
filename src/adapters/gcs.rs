use super::credentials::AccessToken;
use super::storage::BlobStore;
use crate::core::config::TrainerConfig;
use crate::core::error::{TrainerError, TrainerResult};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, Url};

/// Blob store backed by the Cloud Storage JSON API.
pub struct GcsBlobStore {
    client: Client,
    api_url: String,
    bucket: String,
    token: AccessToken,
}

impl GcsBlobStore {
    pub fn new(config: &TrainerConfig, token: AccessToken) -> TrainerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TrainerError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: config.storage_api_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token,
        })
    }

    /// Object name of a model's pipeline config, relative to the bucket.
    pub fn pipeline_config_name(team_id: &str, model_id: &str) -> String {
        format!("{}/models/{}/pipeline.config", team_id, model_id)
    }

    fn object_url(&self, blob_name: &str) -> TrainerResult<Url> {
        let mut url = Url::parse(&format!("{}/storage/v1/b", self.api_url))
            .map_err(|e| TrainerError::Config(format!("Invalid storage API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TrainerError::Config("Storage API URL cannot be a base".to_string()))?
            .push(&self.bucket)
            .push("o")
            .push(blob_name);
        Ok(url)
    }

    async fn check(&self, what: &str, response: Response) -> TrainerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("{} failed with status {}: {}", what, status, error_text);
        Err(TrainerError::Storage(format!(
            "{} failed with status {}: {}",
            what, status, error_text
        )))
    }
}

fn storage_error(err: reqwest::Error) -> TrainerError {
    TrainerError::Storage(err.to_string())
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn fetch_blob(&self, blob_name: &str) -> TrainerResult<String> {
        let mut url = self.object_url(blob_name)?;
        url.query_pairs_mut().append_pair("alt", "media");
        debug!("Downloading gs://{}/{}", self.bucket, blob_name);
        let response = self
            .client
            .get(url)
            .headers(self.token.headers()?)
            .send()
            .await
            .map_err(storage_error)?;
        let response = self.check("Blob download", response).await?;
        response.text().await.map_err(storage_error)
    }

    async fn store_pipeline_config(
        &self,
        team_id: &str,
        model_id: &str,
        content: &str,
    ) -> TrainerResult<String> {
        let blob_name = Self::pipeline_config_name(team_id, model_id);
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_url, self.bucket);
        let mut headers = self.token.headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", blob_name.as_str())])
            .headers(headers)
            .body(content.to_string())
            .send()
            .await
            .map_err(storage_error)?;
        self.check("Pipeline config upload", response).await?;
        let path = format!("gs://{}/{}", self.bucket, blob_name);
        info!("Stored pipeline config at {}", path);
        Ok(path)
    }

    fn model_folder(&self, team_id: &str, model_id: &str) -> String {
        format!("gs://{}/{}/models/{}", self.bucket, team_id, model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GcsBlobStore {
        let config = TrainerConfig::for_project("bucket").with_storage_api_url("http://localhost:4443");
        GcsBlobStore::new(&config, AccessToken::new("t").unwrap()).unwrap()
    }

    #[test]
    fn test_object_url_escapes_slashes() {
        let url = store().object_url("static/training/a.config").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:4443/storage/v1/b/bucket/o/static%2Ftraining%2Fa.config"
        );
    }

    #[test]
    fn test_model_paths() {
        let store = store();
        assert_eq!(store.model_folder("t1", "m1"), "gs://bucket/t1/models/m1");
        assert_eq!(GcsBlobStore::pipeline_config_name("t1", "m1"), "t1/models/m1/pipeline.config");
    }
}
