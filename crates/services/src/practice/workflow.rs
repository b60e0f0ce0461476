use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use trach_core::model::PracticeSettings;

use crate::error::PracticeError;
use crate::settings_service::PracticeSettingsService;
use super::session::{AnswerResult, HintGate, PracticeSession};
use super::snapshot::PracticeSnapshot;

/// Result of asking for the next hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintAdvance {
    pub advanced: bool,
    /// True exactly once: the first hint ever advanced, so the host can
    /// explain that tapping the hint reveals the next step.
    pub show_help: bool,
}

/// Owns a practice session, the learner's settings and the one outstanding
/// timer that draws the next problem after a completed one.
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct PracticeLoopService {
    session: Arc<Mutex<PracticeSession>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    settings: Arc<Mutex<PracticeSettings>>,
    settings_service: PracticeSettingsService,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        session: PracticeSession,
        settings_service: PracticeSettingsService,
        settings: PracticeSettings,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            timer: Arc::new(Mutex::new(None)),
            settings: Arc::new(Mutex::new(settings)),
            settings_service,
        }
    }

    /// Build the loop with settings loaded from storage (defaults on failure).
    pub async fn load(session: PracticeSession, settings_service: PracticeSettingsService) -> Self {
        let settings = settings_service.load_or_default().await;
        Self::new(session, settings_service, settings)
    }

    #[must_use]
    pub fn settings(&self) -> PracticeSettings {
        *lock(&self.settings)
    }

    /// Turn hints on or off and persist the choice.
    ///
    /// A persistence failure is logged; the new value still applies to this run.
    pub async fn set_hints_enabled(&self, enabled: bool) {
        let updated = {
            let mut settings = lock(&self.settings);
            *settings = settings.with_hints_enabled(enabled);
            *settings
        };
        self.persist(updated).await;
    }

    #[must_use]
    pub fn snapshot(&self) -> PracticeSnapshot {
        lock(&self.session).snapshot()
    }

    #[must_use]
    pub fn hint_gate(&self) -> HintGate {
        let settings = self.settings();
        lock(&self.session).hint_gate(&settings)
    }

    /// True while a regeneration timer task is scheduled and not yet finished.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        lock(&self.timer)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Draw a new problem, cancelling any scheduled regeneration.
    pub fn start_problem(&self) {
        self.cancel_timer();
        lock(&self.session).start_problem();
    }

    /// Submit an answer for the current digit.
    ///
    /// When hints are enabled the learner must first view the required
    /// number of hints for this digit. Completing the problem schedules the
    /// next one.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::NoActiveProblem` before the first problem or
    /// after a reset, and `PracticeError::HintsRequired` while the hint gate
    /// is closed.
    pub fn answer(&self, choice_index: usize) -> Result<AnswerResult, PracticeError> {
        let settings = self.settings();
        let (result, pending, delay) = {
            let mut session = lock(&self.session);
            if session.problem().is_none() {
                return Err(PracticeError::NoActiveProblem);
            }
            let gate = session.hint_gate(&settings);
            if !session.is_complete() && !gate.is_open() {
                return Err(PracticeError::HintsRequired {
                    viewed: gate.viewed,
                    required: gate.required,
                });
            }
            let result = session.submit_answer(choice_index);
            (
                result,
                session.pending_regeneration(),
                session.config().regeneration_delay(),
            )
        };

        if result.is_correct && result.is_complete {
            if let Some(pending) = pending {
                self.schedule_timer(pending.ticket, delay);
            }
        }
        Ok(result)
    }

    /// Reveal the next hint step for the current digit.
    ///
    /// Does nothing while hints are turned off. The first hint ever advanced
    /// also flips and persists the "help shown" flag.
    pub async fn advance_hint(&self) -> HintAdvance {
        const IGNORED: HintAdvance = HintAdvance {
            advanced: false,
            show_help: false,
        };
        if !self.settings().hints_enabled() {
            debug!("hint requested while hints are off");
            return IGNORED;
        }
        if !lock(&self.session).advance_hint() {
            return IGNORED;
        }

        let first_help = {
            let mut settings = lock(&self.settings);
            if settings.hint_help_shown() {
                None
            } else {
                *settings = settings.with_hint_help_shown(true);
                Some(*settings)
            }
        };
        let show_help = first_help.is_some();
        if let Some(updated) = first_help {
            self.persist(updated).await;
        }

        HintAdvance {
            advanced: true,
            show_help,
        }
    }

    pub fn reset_hints(&self) {
        lock(&self.session).reset_hints();
    }

    /// Cancel the regeneration timer and clear the session.
    pub fn reset_practice(&self) {
        self.cancel_timer();
        lock(&self.session).reset_practice();
    }

    /// Start the next problem if its deadline has passed on the session clock.
    ///
    /// For hosts that drive their own loop instead of relying on the timer.
    pub fn poll_regeneration(&self) -> bool {
        lock(&self.session).poll_regeneration()
    }

    fn schedule_timer(&self, ticket: u64, delay: Duration) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(ticket, "no async runtime, regeneration left to polling");
            return;
        };
        let session = Arc::clone(&self.session);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&session).fire_regeneration(ticket);
        });
        debug!(ticket, ?delay, "regeneration timer scheduled");
        if let Some(previous) = lock(&self.timer).replace(task) {
            previous.abort();
        }
    }

    fn cancel_timer(&self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
            debug!("regeneration timer cancelled");
        }
    }

    async fn persist(&self, settings: PracticeSettings) {
        if let Err(err) = self.settings_service.save(&settings).await {
            warn!(%err, "failed to persist practice settings");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
