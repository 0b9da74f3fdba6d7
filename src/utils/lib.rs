use crate::core::config::TrainerConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Cloud project that owns the jobs; also the bucket name unless --bucket is given
    #[clap(long, env = "TRAINER_PROJECT_ID")]
    pub project: String,

    #[clap(long, env = "TRAINER_BUCKET")]
    pub bucket: Option<String>,

    #[clap(long, env = "TRAINER_STATE_DIR", value_parser, default_value = "./state")]
    pub state_dir: PathBuf,

    #[clap(long, default_value = "us-central1")]
    pub region: String,

    /// Upper bound on each job's running time, in seconds
    #[clap(long, default_value = "3600")]
    pub max_running_time: u64,

    #[clap(long, env = "TRAINER_ML_API_URL")]
    pub ml_api_url: Option<String>,

    #[clap(long, env = "TRAINER_STORAGE_API_URL")]
    pub storage_api_url: Option<String>,

    /// Per-request timeout for calls to the cloud APIs, in seconds
    #[clap(long, default_value = "60")]
    pub request_timeout: u64,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit training (and eval) jobs for a dataset
    Start {
        #[clap(long)]
        team: String,
        #[clap(long)]
        dataset: String,
    },
    /// Poll the jobs of a model and print its record
    Status {
        #[clap(long)]
        team: String,
        #[clap(long)]
        model: String,
    },
    /// Print the stored record of a model without polling
    Show {
        #[clap(long)]
        team: String,
        #[clap(long)]
        model: String,
    },
    /// Cancel any running jobs of a model and delete its record
    Delete {
        #[clap(long)]
        team: String,
        #[clap(long)]
        model: String,
    },
    /// Print the stored records of a team without polling
    List {
        #[clap(long)]
        team: String,
    },
}

impl Args {
    pub fn trainer_config(&self) -> TrainerConfig {
        let mut config = TrainerConfig::for_project(&self.project)
            .with_region(&self.region)
            .with_max_running_time(Duration::from_secs(self.max_running_time))
            .with_request_timeout(Duration::from_secs(self.request_timeout));
        if let Some(bucket) = &self.bucket {
            config = config.with_bucket(bucket);
        }
        if let Some(url) = &self.ml_api_url {
            config = config.with_ml_api_url(url);
        }
        if let Some(url) = &self.storage_api_url {
            config = config.with_storage_api_url(url);
        }
        config
    }
}
