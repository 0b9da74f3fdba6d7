use super::storage::EntityStore;
use crate::core::error::{TrainerError, TrainerResult};
use crate::core::model::{DatasetDescription, ModelRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Entity store keeping one JSON file per dataset and model:
///
/// ```text
/// <root>/<team_id>/datasets/<dataset_id>.json
/// <root>/<team_id>/models/<model_id>.json
/// ```
pub struct LocalEntityStore {
    root: PathBuf,
}

impl LocalEntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("Using local entity store at {:?}", root);
        Self { root }
    }

    fn dataset_path(&self, team_id: &str, dataset_id: &str) -> TrainerResult<PathBuf> {
        Ok(self
            .root
            .join(checked_id("team", team_id)?)
            .join("datasets")
            .join(format!("{}.json", checked_id("dataset", dataset_id)?)))
    }

    fn models_dir(&self, team_id: &str) -> TrainerResult<PathBuf> {
        Ok(self.root.join(checked_id("team", team_id)?).join("models"))
    }

    fn model_path(&self, team_id: &str, model_id: &str) -> TrainerResult<PathBuf> {
        Ok(self
            .models_dir(team_id)?
            .join(format!("{}.json", checked_id("model", model_id)?)))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> TrainerResult<T> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TrainerError::NotFound(format!("{} {:?}", what, path)))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&content)?)
    }

    async fn write_model(&self, record: &ModelRecord) -> TrainerResult<()> {
        let path = self.model_path(&record.team_id, &record.model_id)?;
        if fs::metadata(&path).await.is_err() {
            return Err(TrainerError::NotFound(format!("model {:?}", path)));
        }
        let content = serde_json::to_vec_pretty(record)?;
        // Write then rename so readers never see a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Wrote model record {:?}", path);
        Ok(())
    }
}

/// Ids become file names, so anything that could leave the store's directory is
/// refused.
fn checked_id<'a>(kind: &str, id: &'a str) -> TrainerResult<&'a str> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(&['/', '\\'][..])
        && !id.contains("..");
    if valid {
        Ok(id)
    } else {
        Err(TrainerError::InvalidId(format!("{} id {:?}", kind, id)))
    }
}

#[async_trait]
impl EntityStore for LocalEntityStore {
    async fn retrieve_dataset(&self, team_id: &str, dataset_id: &str) -> TrainerResult<DatasetDescription> {
        Self::read_json(&self.dataset_path(team_id, dataset_id)?, "dataset").await
    }

    async fn retrieve_model(&self, team_id: &str, model_id: &str) -> TrainerResult<ModelRecord> {
        Self::read_json(&self.model_path(team_id, model_id)?, "model").await
    }

    async fn list_models(&self, team_id: &str) -> TrainerResult<Vec<ModelRecord>> {
        let dir = self.models_dir(team_id)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut models = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match Self::read_json::<ModelRecord>(&path, "model").await {
                    Ok(record) => models.push(record),
                    Err(e) => warn!("Skipping unreadable model record {:?}: {}", path, e),
                }
            }
        }
        models.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(models)
    }

    async fn reserve_model_id(
        &self,
        team_id: &str,
        dataset_id: &str,
        start_time: DateTime<Utc>,
    ) -> TrainerResult<String> {
        checked_id("dataset", dataset_id)?;
        fs::create_dir_all(self.models_dir(team_id)?).await?;
        let model_id = Uuid::new_v4().simple().to_string();
        let path = self.model_path(team_id, &model_id)?;
        let placeholder = ModelRecord::starting(team_id, &model_id, dataset_id, start_time);
        // The hard link only succeeds if no record exists under this id, and it
        // publishes the fully written file in one step.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&placeholder)?).await?;
        let linked = fs::hard_link(&tmp, &path).await;
        fs::remove_file(&tmp).await?;
        linked?;
        info!("Reserved model id {} for team {}", model_id, team_id);
        Ok(model_id)
    }

    async fn save_started_model(&self, record: &ModelRecord) -> TrainerResult<()> {
        self.write_model(record).await
    }

    async fn save_updated_model(&self, record: &ModelRecord) -> TrainerResult<()> {
        self.write_model(record).await
    }

    async fn delete_model(&self, team_id: &str, model_id: &str) -> TrainerResult<()> {
        let path = self.model_path(team_id, model_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted model {} for team {}", model_id, team_id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TrainerError::NotFound(format!("model {:?}", path)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
