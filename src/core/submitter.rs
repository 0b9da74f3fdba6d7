use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::TrainingService;
use crate::core::config::TrainerConfig;
use crate::core::error::{TrainerError, TrainerResult};
use crate::core::job::SubJob;
use crate::core::model::{JobResponse, JobSpec, ModelRecord, Scheduling, TrainingInput};
use crate::core::trainer::ModelTrainer;
use chrono::{DateTime, Utc};
use log::{error, info};

/// Paths shared by the train and eval jobs of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub model_dir: String,
    pub pipeline_config_path: String,
}

fn training_input(
    config: &TrainerConfig,
    paths: &JobPaths,
    scale_tier: &str,
    python_module: &str,
    args: Vec<String>,
) -> TrainingInput {
    TrainingInput {
        scale_tier: scale_tier.to_string(),
        package_uris: config.package_uris.clone(),
        python_module: python_module.to_string(),
        args,
        region: config.region.clone(),
        job_dir: paths.model_dir.clone(),
        runtime_version: config.runtime_version.clone(),
        python_version: config.python_version.clone(),
        scheduling: Scheduling { max_running_time: config.max_running_time_arg() },
    }
}

pub fn train_job_spec(config: &TrainerConfig, model_id: &str, paths: &JobPaths) -> JobSpec {
    let args = vec![
        "--model_dir".to_string(),
        paths.model_dir.clone(),
        "--tpu_zone".to_string(),
        config.tpu_zone.clone(),
        "--pipeline_config_path".to_string(),
        paths.pipeline_config_path.clone(),
    ];
    JobSpec {
        job_id: SubJob::Train.job_id(model_id),
        training_input: training_input(
            config,
            paths,
            &config.train_scale_tier,
            &config.train_module,
            args,
        ),
    }
}

/// Eval reads checkpoints from the model directory the train job writes to.
pub fn eval_job_spec(config: &TrainerConfig, model_id: &str, paths: &JobPaths) -> JobSpec {
    let args = vec![
        "--model_dir".to_string(),
        paths.model_dir.clone(),
        "--pipeline_config_path".to_string(),
        paths.pipeline_config_path.clone(),
        "--checkpoint_dir".to_string(),
        paths.model_dir.clone(),
    ];
    JobSpec {
        job_id: SubJob::Eval.job_id(model_id),
        training_input: training_input(
            config,
            paths,
            &config.eval_scale_tier,
            &config.eval_module,
            args,
        ),
    }
}

impl<S, E, B> ModelTrainer<S, E, B>
where
    S: TrainingService,
    E: EntityStore,
    B: BlobStore,
{
    /// Submits the train job, and the eval job when the dataset has eval records,
    /// then stores and returns the new record.
    ///
    /// The model id is reserved before anything is submitted, so a start that fails
    /// halfway leaves a `NOT_STARTED` placeholder behind that can be deleted.
    pub async fn start_training_job(
        &self,
        team_id: &str,
        dataset_id: &str,
        start_time: DateTime<Utc>,
    ) -> TrainerResult<ModelRecord> {
        let dataset = self.store.retrieve_dataset(team_id, dataset_id).await?;
        dataset.validate()?;

        let model_id = self
            .store
            .reserve_model_id(team_id, dataset_id, start_time)
            .await?;
        info!("Starting training for dataset {} as model {}", dataset_id, model_id);

        let pipeline_config_path = self.create_pipeline_config(team_id, &model_id, &dataset).await?;
        let paths = JobPaths {
            model_dir: self.blobs.model_folder(team_id, &model_id),
            pipeline_config_path,
        };

        let train_job = self.submit(train_job_spec(&self.config, &model_id, &paths)).await?;
        let eval_job = if dataset.has_eval_records() {
            Some(self.submit(eval_job_spec(&self.config, &model_id, &paths)).await?)
        } else {
            info!("Dataset {} has no eval records; skipping eval job", dataset_id);
            None
        };

        let record = ModelRecord::started(
            &dataset,
            &model_id,
            start_time,
            &self.config.fine_tune_checkpoint,
            train_job,
            eval_job,
        );
        self.store.save_started_model(&record).await?;
        Ok(record)
    }

    async fn submit(&self, job: JobSpec) -> TrainerResult<JobResponse> {
        let parent = self.config.parent();
        self.service
            .create_job(&parent, &job)
            .await
            .map_err(|e| {
                error!("Submitting {} failed: {}", job.job_id, e);
                TrainerError::Submission { job_id: job.job_id.clone(), message: e.to_string() }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::training::MockTrainingService;
    use crate::core::job::JobState;
    use crate::core::testing::{dataset, response, trainer, InMemoryStore, PARENT};

    fn paths() -> JobPaths {
        JobPaths {
            model_dir: "gs://bucket/team/models/m1".to_string(),
            pipeline_config_path: "gs://bucket/team/models/m1/pipeline.config".to_string(),
        }
    }

    #[test]
    fn test_train_job_spec() {
        let config = TrainerConfig::for_project("p");
        let spec = train_job_spec(&config, "m1", &paths());
        assert_eq!(spec.job_id, "train_m1");
        let input = &spec.training_input;
        assert_eq!(input.scale_tier, "BASIC_TPU");
        assert_eq!(input.python_module, "object_detection.model_tpu_main");
        assert_eq!(
            input.args,
            vec![
                "--model_dir",
                "gs://bucket/team/models/m1",
                "--tpu_zone",
                "us-central1",
                "--pipeline_config_path",
                "gs://bucket/team/models/m1/pipeline.config",
            ]
        );
        assert_eq!(input.package_uris.len(), 3);
        assert_eq!(input.job_dir, "gs://bucket/team/models/m1");
        assert_eq!(input.runtime_version, "1.15");
        assert_eq!(input.python_version, "3.7");
        assert_eq!(input.scheduling.max_running_time, "3600s");
    }

    #[test]
    fn test_eval_job_spec() {
        let config = TrainerConfig::for_project("p");
        let spec = eval_job_spec(&config, "m1", &paths());
        assert_eq!(spec.job_id, "eval_m1");
        assert_eq!(spec.training_input.scale_tier, "BASIC_GPU");
        assert_eq!(spec.training_input.python_module, "object_detection.model_main");
        assert_eq!(
            spec.training_input.args[4..],
            ["--checkpoint_dir".to_string(), "gs://bucket/team/models/m1".to_string()]
        );
    }

    #[test]
    fn test_job_spec_wire_format() {
        let config = TrainerConfig::for_project("p");
        let value = serde_json::to_value(train_job_spec(&config, "m1", &paths())).unwrap();
        assert_eq!(value["jobId"], "train_m1");
        assert_eq!(value["trainingInput"]["scaleTier"], "BASIC_TPU");
        assert_eq!(value["trainingInput"]["scheduling"]["maxRunningTime"], "3600s");
    }

    #[tokio::test]
    async fn test_start_creates_train_and_eval_jobs() {
        let mut service = MockTrainingService::new();
        service
            .expect_create_job()
            .withf(|parent, job| parent == PARENT && job.job_id == "train_m1")
            .times(1)
            .returning(|_, job| Ok(response(&job.job_id, JobState::Queued)));
        service
            .expect_create_job()
            .withf(|parent, job| parent == PARENT && job.job_id == "eval_m1")
            .times(1)
            .returning(|_, job| Ok(response(&job.job_id, JobState::Queued)));
        let trainer = trainer(service, InMemoryStore::with_dataset(dataset(10)));

        let record = trainer.start_training_job("team", "dataset", Utc::now()).await.unwrap();

        assert_eq!(record.model_id, "m1");
        assert!(record.has_eval_job());
        assert_eq!(record.train_job_state, JobState::Queued);
        assert_eq!(record.eval_job_state, Some(JobState::Queued));
        assert_eq!(record.video_filenames, vec!["match.mp4".to_string()]);
        assert_eq!(trainer.store.model("m1"), Some(record));

        let rendered = trainer.blobs.get("team/models/m1/pipeline.config").unwrap();
        assert_eq!(rendered, "num_classes: 3\nnum_examples: 500\n");
    }

    #[tokio::test]
    async fn test_start_without_eval_records_creates_only_train_job() {
        let mut service = MockTrainingService::new();
        service
            .expect_create_job()
            .withf(|_, job| job.job_id == "train_m1")
            .times(1)
            .returning(|_, job| Ok(response(&job.job_id, JobState::Queued)));
        let trainer = trainer(service, InMemoryStore::with_dataset(dataset(0)));

        let record = trainer.start_training_job("team", "dataset", Utc::now()).await.unwrap();

        assert!(!record.has_eval_job());
        assert_eq!(record.eval_job_state, None);
        assert!(record.eval_job.is_none());
    }

    #[tokio::test]
    async fn test_start_with_unknown_dataset_fails_before_reserving() {
        let service = MockTrainingService::new();
        let trainer = trainer(service, InMemoryStore::default());

        let result = trainer.start_training_job("team", "missing", Utc::now()).await;

        assert!(matches!(result, Err(TrainerError::NotFound(_))));
        assert!(trainer.store.models.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_submission_leaves_placeholder() {
        let mut service = MockTrainingService::new();
        service
            .expect_create_job()
            .times(1)
            .returning(|_, _| Err(TrainerError::Transport("quota exceeded".to_string())));
        let trainer = trainer(service, InMemoryStore::with_dataset(dataset(10)));

        let result = trainer.start_training_job("team", "dataset", Utc::now()).await;

        match result {
            Err(TrainerError::Submission { job_id, message }) => {
                assert_eq!(job_id, "train_m1");
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected submission error, got {:?}", other),
        }
        assert!(trainer.store.model("m1").unwrap().is_placeholder());
    }
}
