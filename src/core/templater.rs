use crate::adapters::storage::{BlobStore, EntityStore};
use crate::adapters::training::TrainingService;
use crate::core::error::TrainerResult;
use crate::core::model::DatasetDescription;
use crate::core::trainer::ModelTrainer;
use log::{debug, info};

const NUM_CLASSES: &str = "TO_BE_CONFIGURED/num_classes";
const FINE_TUNE_CHECKPOINT: &str = "TO_BE_CONFIGURED/fine_tune_checkpoint";
const TRAIN_INPUT_PATH: &str = "TO_BE_CONFIGURED/train_input_path";
const LABEL_MAP_PATH: &str = "TO_BE_CONFIGURED/label_map_path";
const EVAL_INPUT_PATH: &str = "TO_BE_CONFIGURED/eval_input_path";
const NUM_EXAMPLES: &str = "TO_BE_CONFIGURED/num_examples";

/// Fills the template's placeholders with plain find/replace. A placeholder the
/// template does not contain is simply skipped.
pub fn render_pipeline_config(
    template: &str,
    dataset: &DatasetDescription,
    fine_tune_checkpoint: &str,
) -> String {
    let substitutions = [
        (NUM_CLASSES, dataset.num_classes().to_string()),
        (FINE_TUNE_CHECKPOINT, fine_tune_checkpoint.to_string()),
        (TRAIN_INPUT_PATH, dataset.train_input_path.clone()),
        (LABEL_MAP_PATH, dataset.label_map_path.clone()),
        (EVAL_INPUT_PATH, dataset.eval_input_path.clone()),
        (NUM_EXAMPLES, dataset.eval_frame_count.to_string()),
    ];
    substitutions
        .iter()
        .fold(template.to_string(), |config, (placeholder, value)| {
            if !config.contains(placeholder) {
                debug!("Template has no {} placeholder", placeholder);
            }
            config.replace(placeholder, value)
        })
}

impl<S, E, B> ModelTrainer<S, E, B>
where
    S: TrainingService,
    E: EntityStore,
    B: BlobStore,
{
    /// Renders the pipeline config for `model_id` and stores it, returning the
    /// path the jobs should be given.
    pub async fn create_pipeline_config(
        &self,
        team_id: &str,
        model_id: &str,
        dataset: &DatasetDescription,
    ) -> TrainerResult<String> {
        let template = self.blobs.fetch_blob(&self.config.config_template_blob).await?;
        let pipeline_config =
            render_pipeline_config(&template, dataset, &self.config.fine_tune_checkpoint);
        let path = self
            .blobs
            .store_pipeline_config(team_id, model_id, &pipeline_config)
            .await?;
        info!("Pipeline config for model {} stored at {}", model_id, path);
        Ok(path)
    }
}
