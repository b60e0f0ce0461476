use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use trach_core::model::PracticeSettings;

use crate::repository::{SettingsRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT hints_enabled, hint_help_shown
            FROM practice_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hints_enabled: bool = row
            .try_get("hints_enabled")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let hint_help_shown: bool = row
            .try_get("hint_help_shown")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(PracticeSettings::new(hints_enabled, hint_help_shown)))
    }

    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO practice_settings (id, hints_enabled, hint_help_shown, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                hints_enabled = excluded.hints_enabled,
                hint_help_shown = excluded.hint_help_shown,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(settings.hints_enabled())
        .bind(settings.hint_help_shown())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
