use std::time::Duration;

pub const DEFAULT_ML_API_URL: &str = "https://ml.googleapis.com/v1";
pub const DEFAULT_STORAGE_API_URL: &str = "https://storage.googleapis.com";
pub const DEFAULT_MAX_RUNNING_TIME: Duration = Duration::from_secs(3600);

/// Everything the trainer needs to know about the project it submits to.
///
/// Built once and shared read-only by the submitter, reconciler and terminator, so
/// tests can point the whole trainer at fake endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub project_id: String,
    pub bucket: String,
    pub region: String,
    pub tpu_zone: String,
    pub runtime_version: String,
    pub python_version: String,
    pub max_running_time: Duration,
    pub package_uris: Vec<String>,
    pub fine_tune_checkpoint: String,
    pub config_template_blob: String,
    pub train_scale_tier: String,
    pub train_module: String,
    pub eval_scale_tier: String,
    pub eval_module: String,
    pub ml_api_url: String,
    pub storage_api_url: String,
    pub request_timeout: Duration,
}

impl TrainerConfig {
    /// Defaults for a project whose bucket carries the project id as its name.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        let bucket = project_id.clone();
        let static_path = |path: &str| format!("gs://{}/static/training/{}", bucket, path);
        Self {
            package_uris: vec![
                static_path("object_detection-0.1.tar.gz"),
                static_path("slim-0.1.tar.gz"),
                static_path("pycocotools-2.0.tar.gz"),
            ],
            fine_tune_checkpoint: static_path(
                "models/ssd_mobilenet_v1_0.75_depth_300x300_coco14_sync_2018_07_03/model.ckpt",
            ),
            config_template_blob:
                "static/training/models/configs/ssd_mobilenet_v1_0.75_depth_quantized_300x300_pets_sync.config"
                    .to_string(),
            region: "us-central1".to_string(),
            tpu_zone: "us-central1".to_string(),
            runtime_version: "1.15".to_string(),
            python_version: "3.7".to_string(),
            max_running_time: DEFAULT_MAX_RUNNING_TIME,
            train_scale_tier: "BASIC_TPU".to_string(),
            train_module: "object_detection.model_tpu_main".to_string(),
            eval_scale_tier: "BASIC_GPU".to_string(),
            eval_module: "object_detection.model_main".to_string(),
            ml_api_url: DEFAULT_ML_API_URL.to_string(),
            storage_api_url: DEFAULT_STORAGE_API_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            bucket,
            project_id,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.tpu_zone = region.clone();
        self.region = region;
        self
    }

    /// Moves the bucket, along with the static assets stored in it.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let old_prefix = format!("gs://{}/", self.bucket);
        let new_prefix = format!("gs://{}/", bucket);
        let rebase = |path: &str| path.replacen(&old_prefix, &new_prefix, 1);
        self.package_uris = self.package_uris.iter().map(|uri| rebase(uri)).collect();
        self.fine_tune_checkpoint = rebase(&self.fine_tune_checkpoint);
        self.bucket = bucket;
        self
    }

    pub fn with_max_running_time(mut self, max_running_time: Duration) -> Self {
        self.max_running_time = max_running_time;
        self
    }

    pub fn with_ml_api_url(mut self, url: impl Into<String>) -> Self {
        self.ml_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_storage_api_url(mut self, url: impl Into<String>) -> Self {
        self.storage_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Scope every job is created under.
    pub fn parent(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    /// `maxRunningTime` in the service's duration format.
    pub fn max_running_time_arg(&self) -> String {
        format!("{}s", self.max_running_time.as_secs())
    }
}
