use std::sync::Arc;

use storage::repository::Storage;
use trach_core::Clock;
use trach_core::model::PracticeConfig;

use crate::error::AppServicesError;
use crate::practice::{PracticeLoopService, PracticeSession};
use crate::settings_service::PracticeSettingsService;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    practice: Arc<PracticeLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: PracticeConfig,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, config, seed).await)
    }

    /// Build services over an already opened storage backend.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        config: PracticeConfig,
        seed: Option<u64>,
    ) -> Self {
        let settings = PracticeSettingsService::new(Arc::clone(&storage.settings));
        let mut session = PracticeSession::new(config).with_clock(clock);
        if let Some(seed) = seed {
            session = session.with_seed(seed);
        }
        let practice = PracticeLoopService::load(session, settings).await;
        Self {
            practice: Arc::new(practice),
        }
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice)
    }
}
