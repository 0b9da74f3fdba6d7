//! Fixtures shared by the unit tests.

use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::MockTrainingService;
use crate::core::config::TrainerConfig;
use crate::core::error::{TrainerError, TrainerResult};
use crate::core::job::JobState;
use crate::core::model::{DatasetDescription, JobResponse, ModelRecord};
use crate::core::trainer::ModelTrainer;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub const PARENT: &str = "projects/test-project";

pub fn dataset(eval_record_count: u64) -> DatasetDescription {
    DatasetDescription {
        team_id: "team".to_string(),
        dataset_id: "dataset".to_string(),
        sorted_label_list: vec!["ball".to_string(), "goal".to_string(), "robot".to_string()],
        train_input_path: "gs://bucket/team/train.record".to_string(),
        eval_input_path: "gs://bucket/team/eval.record".to_string(),
        label_map_path: "gs://bucket/team/label_map.pbtxt".to_string(),
        eval_frame_count: 500,
        eval_record_count,
        video_filenames: vec!["match.mp4".to_string()],
    }
}

pub fn response(job_id: &str, state: JobState) -> JobResponse {
    JobResponse { job_id: job_id.to_string(), state, ..Default::default() }
}

/// A record with submitted jobs in the given states.
pub fn record(train: JobState, eval: Option<JobState>) -> ModelRecord {
    let dataset = dataset(if eval.is_some() { 10 } else { 0 });
    ModelRecord::started(
        &dataset,
        "m1",
        Utc::now(),
        "gs://ckpt",
        response("train_m1", train),
        eval.map(|state| response("eval_m1", state)),
    )
}

#[derive(Default)]
pub struct InMemoryStore {
    pub datasets: Mutex<HashMap<String, DatasetDescription>>,
    pub models: Mutex<HashMap<String, ModelRecord>>,
    pub writes: Mutex<usize>,
}

impl InMemoryStore {
    pub fn with_dataset(dataset: DatasetDescription) -> Self {
        let store = Self::default();
        store.datasets.lock().unwrap().insert(dataset.dataset_id.clone(), dataset);
        store
    }

    pub fn with_model(record: ModelRecord) -> Self {
        let store = Self::default();
        store.models.lock().unwrap().insert(record.model_id.clone(), record);
        store
    }

    pub fn model(&self, model_id: &str) -> Option<ModelRecord> {
        self.models.lock().unwrap().get(model_id).cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn retrieve_dataset(&self, _team_id: &str, dataset_id: &str) -> TrainerResult<DatasetDescription> {
        self.datasets
            .lock()
            .unwrap()
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| TrainerError::NotFound(format!("dataset {}", dataset_id)))
    }

    async fn retrieve_model(&self, _team_id: &str, model_id: &str) -> TrainerResult<ModelRecord> {
        self.model(model_id)
            .ok_or_else(|| TrainerError::NotFound(format!("model {}", model_id)))
    }

    async fn list_models(&self, _team_id: &str) -> TrainerResult<Vec<ModelRecord>> {
        Ok(self.models.lock().unwrap().values().cloned().collect())
    }

    async fn reserve_model_id(
        &self,
        team_id: &str,
        dataset_id: &str,
        start_time: DateTime<Utc>,
    ) -> TrainerResult<String> {
        let model_id = "m1".to_string();
        let placeholder = ModelRecord::starting(team_id, &model_id, dataset_id, start_time);
        self.models.lock().unwrap().insert(model_id.clone(), placeholder);
        Ok(model_id)
    }

    async fn save_started_model(&self, record: &ModelRecord) -> TrainerResult<()> {
        self.save_updated_model(record).await
    }

    async fn save_updated_model(&self, record: &ModelRecord) -> TrainerResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.models.lock().unwrap().insert(record.model_id.clone(), record.clone());
        Ok(())
    }

    async fn delete_model(&self, _team_id: &str, model_id: &str) -> TrainerResult<()> {
        self.models
            .lock()
            .unwrap()
            .remove(model_id)
            .map(|_| ())
            .ok_or_else(|| TrainerError::NotFound(format!("model {}", model_id)))
    }
}

#[derive(Default)]
pub struct InMemoryBlobs {
    pub blobs: Mutex<HashMap<String, String>>,
}

impl InMemoryBlobs {
    pub fn with_template(name: &str, template: &str) -> Self {
        let blobs = Self::default();
        blobs.blobs.lock().unwrap().insert(name.to_string(), template.to_string());
        blobs
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.blobs.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobs {
    async fn fetch_blob(&self, blob_name: &str) -> TrainerResult<String> {
        self.get(blob_name)
            .ok_or_else(|| TrainerError::Storage(format!("no such blob {}", blob_name)))
    }

    async fn store_pipeline_config(
        &self,
        team_id: &str,
        model_id: &str,
        content: &str,
    ) -> TrainerResult<String> {
        let name = format!("{}/models/{}/pipeline.config", team_id, model_id);
        self.blobs.lock().unwrap().insert(name.clone(), content.to_string());
        Ok(format!("gs://bucket/{}", name))
    }

    fn model_folder(&self, team_id: &str, model_id: &str) -> String {
        format!("gs://bucket/{}/models/{}", team_id, model_id)
    }
}

pub fn config() -> TrainerConfig {
    TrainerConfig::for_project("test-project")
}

pub fn trainer(
    service: MockTrainingService,
    store: InMemoryStore,
) -> ModelTrainer<MockTrainingService, InMemoryStore, InMemoryBlobs> {
    let config = config();
    let blobs = InMemoryBlobs::with_template(
        &config.config_template_blob,
        "num_classes: TO_BE_CONFIGURED/num_classes\nnum_examples: TO_BE_CONFIGURED/num_examples\n",
    );
    ModelTrainer::new(config, service, store, blobs)
}
