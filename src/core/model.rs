use crate::core::error::{TrainerError, TrainerResult};
use crate::core::job::{CompositeState, JobState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A labelled dataset that has already been turned into TFRecords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescription {
    pub team_id: String,
    pub dataset_id: String,
    pub sorted_label_list: Vec<String>,
    pub train_input_path: String,
    pub eval_input_path: String,
    pub label_map_path: String,
    pub eval_frame_count: u64,
    pub eval_record_count: u64,
    #[serde(default)]
    pub video_filenames: Vec<String>,
}

impl DatasetDescription {
    pub fn num_classes(&self) -> usize {
        self.sorted_label_list.len()
    }

    pub fn has_eval_records(&self) -> bool {
        self.eval_record_count > 0
    }

    pub fn validate(&self) -> TrainerResult<()> {
        if self.sorted_label_list.is_empty() {
            return Err(TrainerError::InvalidDataset(format!(
                "dataset {} has no labels",
                self.dataset_id
            )));
        }
        if self.train_input_path.trim().is_empty() {
            return Err(TrainerError::InvalidDataset(format!(
                "dataset {} has no train input path",
                self.dataset_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    /// Duration string in the service's format, e.g. "3600s".
    pub max_running_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingInput {
    pub scale_tier: String,
    pub package_uris: Vec<String>,
    pub python_module: String,
    pub args: Vec<String>,
    pub region: String,
    pub job_dir: String,
    pub runtime_version: String,
    pub python_version: String,
    pub scheduling: Scheduling,
}

/// Body of a job creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub job_id: String,
    pub training_input: TrainingInput,
}

/// A job resource as returned by the training service. Fields this crate does not
/// read are kept in `extra` so the cached payload is not lossy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: String,
    #[serde(default)]
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored record of one training attempt: a train job and, when the dataset has
/// eval records, an eval job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub team_id: String,
    pub model_id: String,
    pub dataset_id: String,
    pub start_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    #[serde(default)]
    pub video_filenames: Vec<String>,
    #[serde(default)]
    pub fine_tune_checkpoint: String,
    has_eval_job: bool,
    pub train_job_state: JobState,
    pub eval_job_state: Option<JobState>,
    pub train_job: Option<JobResponse>,
    pub eval_job: Option<JobResponse>,
}

impl ModelRecord {
    /// Placeholder written when a model id is reserved, before any job exists.
    pub fn starting(
        team_id: &str,
        model_id: &str,
        dataset_id: &str,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id: team_id.to_string(),
            model_id: model_id.to_string(),
            dataset_id: dataset_id.to_string(),
            start_time,
            update_time: Utc::now(),
            video_filenames: Vec::new(),
            fine_tune_checkpoint: String::new(),
            has_eval_job: false,
            train_job_state: JobState::NotStarted,
            eval_job_state: None,
            train_job: None,
            eval_job: None,
        }
    }

    /// Record for freshly submitted jobs. `has_eval_job` is fixed here.
    pub fn started(
        dataset: &DatasetDescription,
        model_id: &str,
        start_time: DateTime<Utc>,
        fine_tune_checkpoint: &str,
        train_job: JobResponse,
        eval_job: Option<JobResponse>,
    ) -> Self {
        Self {
            team_id: dataset.team_id.clone(),
            model_id: model_id.to_string(),
            dataset_id: dataset.dataset_id.clone(),
            start_time,
            update_time: Utc::now(),
            video_filenames: dataset.video_filenames.clone(),
            fine_tune_checkpoint: fine_tune_checkpoint.to_string(),
            has_eval_job: eval_job.is_some(),
            train_job_state: train_job.state,
            eval_job_state: eval_job.as_ref().map(|job| job.state),
            train_job: Some(train_job),
            eval_job,
        }
    }

    pub fn has_eval_job(&self) -> bool {
        self.has_eval_job
    }

    pub fn is_placeholder(&self) -> bool {
        self.train_job_state == JobState::NotStarted
    }

    pub fn composite_state(&self) -> CompositeState {
        CompositeState::from_states(self.train_job_state, self.eval_job_state)
    }

    /// Replaces the cached responses with freshly polled ones. An eval response is
    /// ignored for records that never had an eval job.
    pub fn apply_poll(&mut self, train_job: JobResponse, eval_job: Option<JobResponse>) {
        self.train_job_state = train_job.state;
        self.train_job = Some(train_job);
        if self.has_eval_job {
            if let Some(eval_job) = eval_job {
                self.eval_job_state = Some(eval_job.state);
                self.eval_job = Some(eval_job);
            }
        }
        self.update_time = Utc::now();
    }
}
