use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::info;
use serde::Serialize;
use crate::adapters::cloud_ml::CloudMlService;
use crate::adapters::credentials::AccessToken;
use crate::adapters::gcs::GcsBlobStore;
use crate::adapters::local::LocalEntityStore;
use crate::core::trainer::ModelTrainer;
use crate::utils::lib::*;

type CloudTrainer = ModelTrainer<CloudMlService, LocalEntityStore, GcsBlobStore>;

pub async fn run_cli_interface() -> Result<()> {
    let args = Args::parse();
    let trainer = create_trainer(&args)
        .context("Failed to set up the model trainer")?;

    match &args.command {
        Command::Start { team, dataset } => {
            let record = trainer.start_training_job(team, dataset, Utc::now()).await
                .with_context(|| format!("Failed to start training for dataset {}", dataset))?;
            info!("Started model {}", record.model_id);
            print_json(&record)?;
        },
        Command::Status { team, model } => {
            let record = trainer.refresh(team, model).await
                .with_context(|| format!("Failed to refresh model {}", model))?;
            print_json(&record)?;
        },
        Command::Show { team, model } => {
            let record = trainer.retrieve_model(team, model).await
                .with_context(|| format!("Failed to read model {}", model))?;
            print_json(&record)?;
        },
        Command::Delete { team, model } => {
            trainer.delete_job(team, model).await
                .with_context(|| format!("Failed to delete model {}", model))?;
            println!("Deleted model {}", model);
        },
        Command::List { team } => {
            let records = trainer.list_models(team).await
                .with_context(|| format!("Failed to list models of team {}", team))?;
            print_json(&records)?;
        },
    }
    Ok(())
}

fn create_trainer(args: &Args) -> Result<CloudTrainer> {
    let config = args.trainer_config();
    let token = AccessToken::from_env()
        .context("Failed to load access token")?;
    let service = CloudMlService::new(&config, token.clone())
        .context("Failed to create training service client")?;
    let blobs = GcsBlobStore::new(&config, token)
        .context("Failed to create blob store client")?;
    let store = LocalEntityStore::new(args.state_dir.clone());
    Ok(ModelTrainer::new(config, service, store, blobs))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
