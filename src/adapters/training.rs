use crate::core::error::TrainerResult;
use crate::core::model::{JobResponse, JobSpec};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// The remote job service. Only submission, status and cancellation are used;
/// scheduling and the training itself are up to the service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn create_job(&self, parent: &str, job: &JobSpec) -> TrainerResult<JobResponse>;

    async fn get_job(&self, job_name: &str) -> TrainerResult<JobResponse>;

    /// Returns as soon as the service accepts the request; the job then passes
    /// through `CANCELLING` on its own.
    async fn cancel_job(&self, job_name: &str) -> TrainerResult<()>;
}
