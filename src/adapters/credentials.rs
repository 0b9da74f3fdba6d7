use crate::core::error::{TrainerError, TrainerResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::env;
use std::fmt;

pub const ACCESS_TOKEN_VAR: &str = "TRAINER_ACCESS_TOKEN";

/// OAuth bearer token with the cloud-platform scope.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> TrainerResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TrainerError::Config("access token is empty".to_string()));
        }
        Ok(Self(token.trim().to_string()))
    }

    pub fn from_env() -> TrainerResult<Self> {
        let token = env::var(ACCESS_TOKEN_VAR)
            .map_err(|_| TrainerError::Config(format!("{} must be set", ACCESS_TOKEN_VAR)))?;
        Self::new(token)
    }

    pub fn headers(&self) -> TrainerResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|e| TrainerError::Config(format!("Failed to create Authorization header: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
