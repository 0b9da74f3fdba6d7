use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::TrainingService;
use crate::core::config::TrainerConfig;
use crate::core::error::TrainerResult;
use crate::core::job::SubJob;
use crate::core::model::ModelRecord;

/// Starts, refreshes and deletes training attempts.
///
/// Each public operation is a plain sequence of awaited calls. Nothing here
/// serializes two calls for the same model; callers that refresh or delete the
/// same model concurrently must do that themselves.
pub struct ModelTrainer<S, E, B> {
    pub(crate) service: S,
    pub(crate) store: E,
    pub(crate) blobs: B,
    pub(crate) config: TrainerConfig,
}

impl<S, E, B> ModelTrainer<S, E, B>
where
    S: TrainingService,
    E: EntityStore,
    B: BlobStore,
{
    pub fn new(config: TrainerConfig, service: S, store: E, blobs: B) -> Self {
        Self { service, store, blobs, config }
    }

    /// The stored record, without asking the training service anything.
    pub async fn retrieve_model(&self, team_id: &str, model_id: &str) -> TrainerResult<ModelRecord> {
        self.store.retrieve_model(team_id, model_id).await
    }

    pub async fn list_models(&self, team_id: &str) -> TrainerResult<Vec<ModelRecord>> {
        self.store.list_models(team_id).await
    }

    pub(crate) fn job_name(&self, sub_job: SubJob, model_id: &str) -> String {
        sub_job.job_name(&self.config.parent(), model_id)
    }
}
