pub mod config;
pub mod error;
pub mod job;
pub mod model;
pub mod reconciler;
pub mod submitter;
pub mod templater;
pub mod terminator;
pub mod trainer;

#[cfg(test)]
pub(crate) mod testing;
