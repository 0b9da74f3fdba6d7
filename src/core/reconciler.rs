use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::TrainingService;
use crate::core::error::TrainerResult;
use crate::core::job::{next_action, PollAction, SubJob};
use crate::core::model::ModelRecord;
use crate::core::trainer::ModelTrainer;
use log::{debug, info};

impl<S, E, B> ModelTrainer<S, E, B>
where
    S: TrainingService,
    E: EntityStore,
    B: BlobStore,
{
    /// Brings the stored record up to date with the training service.
    ///
    /// Records whose jobs are all done, and placeholders left by a start that did
    /// not finish, are returned as stored, without a remote call. Otherwise both jobs are polled; an eval job still alive after its train
    /// job failed or was cancelled gets cancelled and polled once more.
    ///
    /// A failed call is returned as is. Whatever was stored before stays stored, and
    /// the next refresh polls again.
    pub async fn refresh(&self, team_id: &str, model_id: &str) -> TrainerResult<ModelRecord> {
        let mut record = self.store.retrieve_model(team_id, model_id).await?;
        if record.is_placeholder() {
            // Polling would turn it into a train-only record and lose the eval job.
            debug!("Model {} has not finished starting; not polling", model_id);
            return Ok(record);
        }
        let state = record.composite_state();
        if !state.needs_poll() {
            debug!("Model {} is done; not polling", model_id);
            return Ok(record);
        }

        let train_job = self.service.get_job(&self.job_name(SubJob::Train, model_id)).await?;
        let eval_job = if record.has_eval_job() {
            let eval_name = self.job_name(SubJob::Eval, model_id);
            let mut eval_job = self.service.get_job(&eval_name).await?;
            if next_action(train_job.state, Some(eval_job.state)) == PollAction::CancelEval {
                info!(
                    "Train job for model {} is {}; cancelling eval job ({})",
                    model_id, train_job.state, eval_job.state
                );
                self.service.cancel_job(&eval_name).await?;
                eval_job = self.service.get_job(&eval_name).await?;
            }
            Some(eval_job)
        } else {
            None
        };

        record.apply_poll(train_job, eval_job);
        self.store.save_updated_model(&record).await?;
        debug!(
            "Model {} is now {:?}",
            model_id,
            record.composite_state()
        );
        Ok(record)
    }
}
