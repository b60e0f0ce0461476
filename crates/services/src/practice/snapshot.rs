use trach_core::generate::ANSWER_CHOICES;
use trach_core::model::{HighlightOffsets, MoveRange};

/// Read-only copy of a practice session for hosts.
///
/// `correct_index` is for host-side styling; hosts should not show it to
/// the learner before they answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeSnapshot {
    pub equation: String,
    pub answer_progress: String,
    pub choices: [u8; ANSWER_CHOICES],
    pub correct_index: usize,
    pub position: usize,
    pub digit_count: usize,
    pub current_move: usize,
    pub move_range: MoveRange,
    pub remainder: u32,
    pub hint_question: String,
    pub hint_result: String,
    pub highlight: HighlightOffsets,
    pub is_complete: bool,
    pub regeneration_pending: bool,
}

impl PracticeSnapshot {
    /// True before the first problem and after a reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equation.is_empty()
    }

    /// Hint steps still available for the current digit.
    #[must_use]
    pub fn hints_remaining(&self) -> usize {
        self.move_range.move_count.saturating_sub(self.current_move)
    }
}
