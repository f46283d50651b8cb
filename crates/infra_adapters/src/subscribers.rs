//! JSON file subscriber source
//!
//! The subscriber listing is a JSON array of [`Subscriber`] records. The
//! whole file is read on every `find_active` call, so a run always sees the
//! listing as it was when the run started.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, PortError};
use domain_billing::{Subscriber, SubscriberSource};

use crate::error::InfraError;

/// Subscriber listing stored in a JSON file
#[derive(Debug, Clone)]
pub struct JsonSubscriberSource {
    path: PathBuf,
}

impl JsonSubscriberSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in the file, active or not
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not a JSON array of
    /// subscribers, or contains a record that cannot be billed.
    pub async fn load_all(&self) -> Result<Vec<Subscriber>, InfraError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| InfraError::io(&self.path, e))?;
        let subscribers: Vec<Subscriber> =
            serde_json::from_slice(&bytes).map_err(|e| InfraError::json(&self.path, e))?;

        for subscriber in &subscribers {
            if let Err(e) = subscriber.ensure_billable() {
                warn!(subscriber_id = %subscriber.id, error = %e, "Rejecting subscriber listing");
                return Err(e.into());
            }
        }

        Ok(subscribers)
    }

    /// Replaces the listing with `subscribers`, creating parent directories
    pub async fn save_all(&self, subscribers: &[Subscriber]) -> Result<(), InfraError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InfraError::io(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(subscribers)
            .map_err(|e| InfraError::json(&self.path, e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| InfraError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = subscribers.len(), "Saved subscriber listing");
        Ok(())
    }
}

impl DomainPort for JsonSubscriberSource {}

#[async_trait]
impl SubscriberSource for JsonSubscriberSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn find_active(&self) -> Result<Vec<Subscriber>, PortError> {
        let all = self.load_all().await?;
        let total = all.len();
        let active: Vec<Subscriber> = all.into_iter().filter(Subscriber::is_active).collect();

        debug!(total, active = active.len(), "Read subscriber listing");
        Ok(active)
    }
}
