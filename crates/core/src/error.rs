use thiserror::Error;

use crate::model::{EquationError, ProblemError, SettingsError};

/// Any error raised by the core crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Equation(#[from] EquationError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
