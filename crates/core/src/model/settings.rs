use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of hints that must be viewed before answering when hints are on.
pub const MIN_HINTS_BEFORE_ANSWER: usize = 1;

/// Default pause between finishing a problem and drawing the next one.
pub const REGENERATION_DELAY_MS: u64 = 2_000;

/// Default number of random draws per answer slot before falling back to a scan.
pub const CHOICE_RETRY_BUDGET: u32 = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("regeneration delay must be > 0 ms")]
    InvalidRegenerationDelay,

    #[error("choice retry budget must be > 0")]
    InvalidChoiceRetryBudget,
}

//
// ─── PERSISTED SETTINGS ────────────────────────────────────────────────────────
//

/// Learner preferences that survive restarts.
///
/// Hint progress (position, move, remainder) is transient and never lives here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSettings {
    hints_enabled: bool,
    hint_help_shown: bool,
}

impl PracticeSettings {
    #[must_use]
    pub fn new(hints_enabled: bool, hint_help_shown: bool) -> Self {
        Self {
            hints_enabled,
            hint_help_shown,
        }
    }

    #[must_use]
    pub fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }

    #[must_use]
    pub fn hint_help_shown(&self) -> bool {
        self.hint_help_shown
    }

    #[must_use]
    pub fn with_hints_enabled(mut self, enabled: bool) -> Self {
        self.hints_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_hint_help_shown(mut self, shown: bool) -> Self {
        self.hint_help_shown = shown;
        self
    }
}

//
// ─── RUNTIME CONFIG ────────────────────────────────────────────────────────────
//

/// Tunables for a practice session. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PracticeConfig {
    min_hints_before_answer: usize,
    regeneration_delay_ms: u64,
    choice_retry_budget: u32,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            min_hints_before_answer: MIN_HINTS_BEFORE_ANSWER,
            regeneration_delay_ms: REGENERATION_DELAY_MS,
            choice_retry_budget: CHOICE_RETRY_BUDGET,
        }
    }
}

impl PracticeConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the delay or retry budget is zero.
    pub fn new(
        min_hints_before_answer: usize,
        regeneration_delay_ms: u64,
        choice_retry_budget: u32,
    ) -> Result<Self, SettingsError> {
        if regeneration_delay_ms == 0 {
            return Err(SettingsError::InvalidRegenerationDelay);
        }
        if choice_retry_budget == 0 {
            return Err(SettingsError::InvalidChoiceRetryBudget);
        }
        Ok(Self {
            min_hints_before_answer,
            regeneration_delay_ms,
            choice_retry_budget,
        })
    }

    #[must_use]
    pub fn with_min_hints_before_answer(mut self, min_hints: usize) -> Self {
        self.min_hints_before_answer = min_hints;
        self
    }

    /// Replace the regeneration delay.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidRegenerationDelay` for a zero delay.
    pub fn with_regeneration_delay_ms(mut self, delay_ms: u64) -> Result<Self, SettingsError> {
        if delay_ms == 0 {
            return Err(SettingsError::InvalidRegenerationDelay);
        }
        self.regeneration_delay_ms = delay_ms;
        Ok(self)
    }

    /// Replace the number of random draws per answer slot.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidChoiceRetryBudget` for a zero budget.
    pub fn with_choice_retry_budget(mut self, budget: u32) -> Result<Self, SettingsError> {
        if budget == 0 {
            return Err(SettingsError::InvalidChoiceRetryBudget);
        }
        self.choice_retry_budget = budget;
        Ok(self)
    }

    #[must_use]
    pub fn min_hints_before_answer(&self) -> usize {
        self.min_hints_before_answer
    }

    #[must_use]
    pub fn regeneration_delay(&self) -> Duration {
        Duration::from_millis(self.regeneration_delay_ms)
    }

    #[must_use]
    pub fn regeneration_delay_ms(&self) -> u64 {
        self.regeneration_delay_ms
    }

    #[must_use]
    pub fn choice_retry_budget(&self) -> u32 {
        self.choice_retry_budget
    }
}
