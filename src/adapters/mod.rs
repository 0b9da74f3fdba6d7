pub mod cloud_ml;
pub mod credentials;
pub mod gcs;
pub mod local;
pub mod storage;
pub mod training;
