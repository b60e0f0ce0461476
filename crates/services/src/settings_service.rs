use std::sync::Arc;

use storage::repository::SettingsRepository;
use tracing::warn;
use trach_core::model::PracticeSettings;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct PracticeSettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl PracticeSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<PracticeSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Load settings, falling back to defaults when storage fails.
    pub async fn load_or_default(&self) -> PracticeSettings {
        self.load().await.unwrap_or_else(|err| {
            warn!(%err, "failed to load practice settings, using defaults");
            PracticeSettings::default()
        })
    }

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn save(&self, settings: &PracticeSettings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(settings).await?;
        Ok(())
    }
}
