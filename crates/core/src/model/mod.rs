mod equation;
mod hint;
mod problem;
mod settings;

pub use equation::{Equation, EquationError, MULTIPLICATION_SIGN, SEPARATOR_CHARS};
pub(crate) use equation::digit_from_right;
pub use hint::{DigitPair, HighlightOffsets, HintStep, MoveRange, ProductHalf};
pub use problem::{
    MAX_ANSWER_DIGITS, MULTIPLICAND_MAX, MULTIPLICAND_MIN, MULTIPLIER_MAX, MULTIPLIER_MIN,
    Problem, ProblemError,
};
pub use settings::{
    CHOICE_RETRY_BUDGET, MIN_HINTS_BEFORE_ANSWER, PracticeConfig, PracticeSettings,
    REGENERATION_DELAY_MS, SettingsError,
};
