//! Backend factory for creating backend instances from configuration.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{LocalBackend, RestBackend, TaskBackend};
use crate::config::ApiConfig;
use crate::storage::LocalStorage;

/// Create the task backend named by `api.backend`.
///
/// `storage` is required for the `local` backend and ignored otherwise.
///
/// # Errors
/// Returns error if:
/// - Backend type is unknown
/// - The REST endpoint is not a valid URL
/// - `local` is requested without storage
pub fn create_backend(config: &ApiConfig, storage: Option<Arc<Mutex<LocalStorage>>>) -> Result<Arc<dyn TaskBackend>> {
    match config.backend.as_str() {
        "rest" => {
            let backend = RestBackend::new(
                &config.endpoint,
                config.attach_id_token,
                Duration::from_secs(config.timeout_seconds),
            )
            .context("Failed to create REST backend")?;
            Ok(Arc::new(backend))
        }
        "local" => {
            let storage = storage.ok_or_else(|| anyhow!("The local backend needs a task database"))?;
            Ok(Arc::new(LocalBackend::new(storage)))
        }
        other => Err(anyhow!("Unknown backend type: {}", other)),
    }
}
