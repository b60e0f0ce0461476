//! Random problem and answer-choice generation.
//!
//! Both generators borrow the caller's RNG so sessions and tests control seeding.

mod choices;
mod problem;

pub use choices::{ANSWER_CHOICES, AnswerChoices, generate_choices};
pub use problem::{generate_problem, is_valid};
