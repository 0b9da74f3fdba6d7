use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::TrainingService;
use crate::core::error::TrainerResult;
use crate::core::job::SubJob;
use crate::core::model::ModelRecord;
use crate::core::trainer::ModelTrainer;
use log::{info, warn};

impl<S, E, B> ModelTrainer<S, E, B>
where
    S: TrainingService,
    E: EntityStore,
    B: BlobStore,
{
    /// Cancels whichever jobs of the model are still alive, then deletes the record.
    ///
    /// Cancellation is not confirmed; the service finishes it on its own. If a poll
    /// or cancel fails, the record is kept so the delete can be retried.
    pub async fn delete_job(&self, team_id: &str, model_id: &str) -> TrainerResult<()> {
        let record = self.store.retrieve_model(team_id, model_id).await?;
        if record.composite_state().needs_poll() {
            self.cancel_if_alive(&record, SubJob::Train).await?;
            // A placeholder does not know whether its eval job got submitted.
            if record.has_eval_job() || record.is_placeholder() {
                self.cancel_if_alive(&record, SubJob::Eval).await?;
            }
        }
        self.store.delete_model(team_id, model_id).await?;
        info!("Deleted model {} of team {}", model_id, team_id);
        Ok(())
    }

    async fn cancel_if_alive(&self, record: &ModelRecord, sub_job: SubJob) -> TrainerResult<()> {
        let job_name = self.job_name(sub_job, &record.model_id);
        let job = match self.service.get_job(&job_name).await {
            Ok(job) => job,
            // A placeholder's jobs may never have been created.
            Err(e) if e.is_not_found() && record.is_placeholder() => {
                warn!("{} does not exist; nothing to cancel", job_name);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if job.state.is_alive() {
            info!("Cancelling {} ({})", job_name, job.state);
            self.service.cancel_job(&job_name).await?;
        }
        Ok(())
    }
}
