use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trach_core::model::PracticeSettings;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence for learner settings.
///
/// Only the settings flags are stored. Practice progress is never persisted.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch stored settings, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError>;

    /// Persist settings, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    settings: Arc<Mutex<Option<PracticeSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(*settings);
        Ok(())
    }
}

/// Settings storage behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            settings: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_repository_has_no_settings() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_settings().await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_settings() {
        let repo = InMemoryRepository::new();
        let settings = PracticeSettings::new(true, false);
        repo.save_settings(&settings).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap(), Some(settings));

        let updated = settings.with_hint_help_shown(true);
        repo.save_settings(&updated).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();
        repo.save_settings(&PracticeSettings::new(true, true))
            .await
            .unwrap();
        assert_eq!(
            other.get_settings().await.unwrap(),
            Some(PracticeSettings::new(true, true))
        );
    }
}
