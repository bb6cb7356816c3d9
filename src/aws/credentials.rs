use anyhow::{anyhow, Result};
use std::fmt;

use crate::config::AwsConfig;

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Read credentials from the environment variables named in `config`
    pub fn from_env(config: &AwsConfig) -> Result<Self> {
        let read = |name: &str| -> Option<String> {
            std::env::var(name).ok().filter(|value| !value.trim().is_empty())
        };

        let access_key_id = read(&config.access_key_env)
            .ok_or_else(|| anyhow!("{} environment variable not set", config.access_key_env))?;
        let secret_access_key = read(&config.secret_key_env)
            .ok_or_else(|| anyhow!("{} environment variable not set", config.secret_key_env))?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: read(&config.session_token_env),
        })
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
