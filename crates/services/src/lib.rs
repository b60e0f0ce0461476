#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod practice;
pub mod settings_service;

pub use trach_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, PracticeError, SettingsServiceError};
pub use practice::{
    AnswerResult, HintAdvance, HintGate, PendingRegeneration, PracticeLoopService,
    PracticeSession, PracticeSnapshot,
};
pub use settings_service::PracticeSettingsService;
