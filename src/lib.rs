//! Submits, polls and cancels object detection training jobs on Cloud ML Engine.
//!
//! A training attempt is a train job plus, when the dataset has eval records, an
//! eval job. [`ModelTrainer`](crate::core::trainer::ModelTrainer) starts attempts, keeps their stored
//! state in step with the service and tears them down.

pub mod adapters;
pub mod cli;
pub mod core;
pub mod utils;
