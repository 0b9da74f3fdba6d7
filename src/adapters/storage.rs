use crate::core::error::TrainerResult;
use crate::core::model::{DatasetDescription, ModelRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Dataset and model records, scoped by team.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn retrieve_dataset(&self, team_id: &str, dataset_id: &str) -> TrainerResult<DatasetDescription>;

    async fn retrieve_model(&self, team_id: &str, model_id: &str) -> TrainerResult<ModelRecord>;

    async fn list_models(&self, team_id: &str) -> TrainerResult<Vec<ModelRecord>>;

    /// Allocates a fresh model id and stores a `NOT_STARTED` placeholder under it.
    /// Must fail rather than reuse an id that is already taken.
    async fn reserve_model_id(
        &self,
        team_id: &str,
        dataset_id: &str,
        start_time: DateTime<Utc>,
    ) -> TrainerResult<String>;

    async fn save_started_model(&self, record: &ModelRecord) -> TrainerResult<()>;

    async fn save_updated_model(&self, record: &ModelRecord) -> TrainerResult<()>;

    async fn delete_model(&self, team_id: &str, model_id: &str) -> TrainerResult<()>;
}

/// Object storage holding the config template and each model's output folder.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch_blob(&self, blob_name: &str) -> TrainerResult<String>;

    /// Stores a rendered pipeline config and returns the path jobs should read it from.
    async fn store_pipeline_config(
        &self,
        team_id: &str,
        model_id: &str,
        content: &str,
    ) -> TrainerResult<String>;

    fn model_folder(&self, team_id: &str, model_id: &str) -> String;
}
