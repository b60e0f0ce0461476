use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::debug;

use trach_core::Clock;
use trach_core::generate::{AnswerChoices, generate_choices, generate_problem};
use trach_core::hint::calculate_step;
use trach_core::model::{
    HighlightOffsets, MoveRange, PracticeConfig, PracticeSettings, Problem,
};
use trach_core::planner;

use super::snapshot::PracticeSnapshot;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of submitting one answer choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerResult {
    pub is_correct: bool,
    pub is_complete: bool,
}

/// The single outstanding "draw the next problem" request.
///
/// A newer ticket invalidates every older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRegeneration {
    pub ticket: u64,
    pub due_at: DateTime<Utc>,
}

/// How many hints the learner has viewed for the current digit versus how
/// many are required before an answer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintGate {
    pub viewed: usize,
    pub required: usize,
}

impl HintGate {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.viewed >= self.required
    }
}

//
// ─── HINT STATE ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct HintState {
    range: MoveRange,
    mv: usize,
    remainder: u32,
    question: String,
    result: String,
    highlight: HighlightOffsets,
}

impl HintState {
    /// Fresh hint state for `position`, seeded with the carry from the previous digit.
    fn seeded(position: usize, carry: u32) -> Self {
        let range = planner::move_range_for(position);
        Self {
            range,
            mv: range.start_move,
            remainder: carry,
            result: if carry > 0 {
                format!("{carry} + ")
            } else {
                String::new()
            },
            ..Self::default()
        }
    }

    fn viewed(&self) -> usize {
        self.mv.saturating_sub(self.range.start_move)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Drives one learner through multiplication problems, one answer digit at
/// a time from the right, with step-by-step hints for each digit.
///
/// All operations run to completion and never fail. Progress only moves
/// forward within a problem: the digit position never decreases until the
/// next problem, and the hint move never decreases until the position
/// changes or hints are reset.
pub struct PracticeSession {
    clock: Clock,
    rng: StdRng,
    config: PracticeConfig,
    problem: Option<Problem>,
    answer_progress: String,
    position: usize,
    choices: AnswerChoices,
    hints: HintState,
    pending: Option<PendingRegeneration>,
    next_ticket: u64,
}

impl PracticeSession {
    /// Empty session on the system clock with an OS-seeded RNG.
    #[must_use]
    pub fn new(config: PracticeConfig) -> Self {
        Self {
            clock: Clock::System,
            rng: StdRng::from_os_rng(),
            config,
            problem: None,
            answer_progress: String::new(),
            position: 0,
            choices: AnswerChoices::default(),
            hints: HintState::default(),
            pending: None,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Use a deterministic RNG for problems and answer choices.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable access to the clock, e.g. to step a fixed clock forward.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────
    //

    /// Draw a new random problem and reset progress to its ones digit.
    pub fn start_problem(&mut self) {
        let problem = generate_problem(&mut self.rng);
        self.start_with(problem);
    }

    /// Start a specific problem, resetting progress to its ones digit.
    pub fn start_with(&mut self, problem: Problem) {
        if let Some(pending) = self.pending.take() {
            debug!(ticket = pending.ticket, "dropping pending regeneration");
        }
        self.problem = Some(problem);
        self.answer_progress.clear();
        self.position = 0;
        self.choices = self.choices_for(problem.digit_at(0));
        self.hints = HintState::seeded(0, 0);
        debug!(equation = %problem, "problem started");
    }

    /// Submit the answer button at `choice_index` for the current digit.
    ///
    /// A wrong choice changes nothing, so the learner may retry. A correct
    /// choice prepends the digit to the answer and moves one position left,
    /// carrying the tens of the running sum into the next digit's hints.
    /// Answering the last digit completes the problem and schedules the next
    /// one after the configured delay.
    pub fn submit_answer(&mut self, choice_index: usize) -> AnswerResult {
        let Some(problem) = self.problem else {
            debug!(choice_index, "answer submitted without a problem");
            return AnswerResult {
                is_correct: false,
                is_complete: false,
            };
        };
        if self.is_complete() {
            return AnswerResult {
                is_correct: false,
                is_complete: true,
            };
        }
        if !self.choices.is_correct(choice_index) {
            debug!(choice_index, position = self.position, "wrong answer");
            return AnswerResult {
                is_correct: false,
                is_complete: false,
            };
        }

        let digit = self.choices.correct_digit();
        self.answer_progress.insert(0, char::from(b'0' + digit));
        self.position += 1;

        if self.position >= problem.digit_count() {
            self.schedule_regeneration();
            debug!(answer = %self.answer_progress, "problem complete");
            return AnswerResult {
                is_correct: true,
                is_complete: true,
            };
        }

        let carry = self.hints.remainder / 10;
        self.choices = self.choices_for(problem.digit_at(self.position));
        self.hints = HintState::seeded(self.position, carry);
        debug!(position = self.position, carry, "advanced to next digit");

        AnswerResult {
            is_correct: true,
            is_complete: false,
        }
    }

    /// Reveal the next teaching step for the current digit.
    ///
    /// Returns `false` (and changes nothing) when there is no problem or the
    /// digit's steps are exhausted.
    pub fn advance_hint(&mut self) -> bool {
        let Some(problem) = self.problem else {
            return false;
        };
        if self.hints.mv >= self.hints.range.move_count {
            return false;
        }

        let step = calculate_step(
            &problem.equation(),
            self.hints.mv,
            self.position,
            self.hints.remainder,
        );
        self.hints.result.push_str(&step.result_display);
        self.hints.question = step.question;
        self.hints.highlight = step.highlight;
        self.hints.remainder = step.new_remainder;
        self.hints.mv += 1;
        debug!(
            mv = self.hints.mv,
            position = self.position,
            remainder = self.hints.remainder,
            "hint advanced"
        );
        true
    }

    /// Clear hint progress without touching the problem or answer progress.
    pub fn reset_hints(&mut self) {
        self.hints = HintState::default();
    }

    /// Cancel any pending regeneration and clear the whole session.
    pub fn reset_practice(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(ticket = pending.ticket, "cancelled pending regeneration");
        }
        self.problem = None;
        self.answer_progress.clear();
        self.position = 0;
        self.choices = AnswerChoices::default();
        self.hints = HintState::default();
    }

    //
    // ─── DEFERRED REGENERATION ─────────────────────────────────────────────
    //

    #[must_use]
    pub fn pending_regeneration(&self) -> Option<PendingRegeneration> {
        self.pending
    }

    /// Start the next problem if the pending regeneration is due on the
    /// session clock. Returns whether a new problem was started.
    pub fn poll_regeneration(&mut self) -> bool {
        match self.pending {
            Some(pending) if self.clock.has_reached(pending.due_at) => {
                debug!(ticket = pending.ticket, "regeneration due");
                self.start_problem();
                true
            }
            _ => false,
        }
    }

    /// Start the next problem if `ticket` is still the outstanding request.
    ///
    /// Stale tickets (replaced, or cancelled by a reset) are ignored.
    pub fn fire_regeneration(&mut self, ticket: u64) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                debug!(ticket, "regeneration fired");
                self.start_problem();
                true
            }
            _ => {
                debug!(ticket, "ignoring stale regeneration");
                false
            }
        }
    }

    fn schedule_regeneration(&mut self) -> PendingRegeneration {
        let pending = PendingRegeneration {
            ticket: self.next_ticket,
            due_at: self.clock.deadline_after(self.config.regeneration_delay()),
        };
        self.next_ticket += 1;
        if let Some(previous) = self.pending.replace(pending) {
            debug!(ticket = previous.ticket, "replaced pending regeneration");
        }
        pending
    }

    fn choices_for(&mut self, digit: u8) -> AnswerChoices {
        generate_choices(&mut self.rng, digit, self.config.choice_retry_budget())
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    /// Equation text, or empty when there is no problem.
    #[must_use]
    pub fn equation(&self) -> String {
        self.problem.map(|p| p.equation()).unwrap_or_default()
    }

    #[must_use]
    pub fn answer_progress(&self) -> &str {
        &self.answer_progress
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn choices(&self) -> &AnswerChoices {
        &self.choices
    }

    #[must_use]
    pub fn current_move(&self) -> usize {
        self.hints.mv
    }

    #[must_use]
    pub fn move_range(&self) -> MoveRange {
        self.hints.range
    }

    #[must_use]
    pub fn remainder(&self) -> u32 {
        self.hints.remainder
    }

    #[must_use]
    pub fn hint_question(&self) -> &str {
        &self.hints.question
    }

    #[must_use]
    pub fn hint_result(&self) -> &str {
        &self.hints.result
    }

    #[must_use]
    pub fn highlight(&self) -> HighlightOffsets {
        self.hints.highlight
    }

    /// Hints advanced so far for the current digit.
    #[must_use]
    pub fn hints_viewed(&self) -> usize {
        self.hints.viewed()
    }

    /// The minimum-hint gate for the current digit.
    ///
    /// Nothing is required when hints are disabled. Otherwise the threshold
    /// is capped at the digit's step count so it can always be met; after
    /// `reset_hints` the digit owns no steps and the gate is open.
    #[must_use]
    pub fn hint_gate(&self, settings: &PracticeSettings) -> HintGate {
        let required = if settings.hints_enabled() {
            self.config
                .min_hints_before_answer()
                .min(self.hints.range.len())
        } else {
            0
        };
        HintGate {
            viewed: self.hints.viewed(),
            required,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.problem
            .is_some_and(|p| self.position >= p.digit_count())
    }

    #[must_use]
    pub fn snapshot(&self) -> PracticeSnapshot {
        PracticeSnapshot {
            equation: self.equation(),
            answer_progress: self.answer_progress.clone(),
            choices: self.choices.digits(),
            correct_index: self.choices.correct_index(),
            position: self.position,
            digit_count: self.problem.map_or(0, |p| p.digit_count()),
            current_move: self.hints.mv,
            move_range: self.hints.range,
            remainder: self.hints.remainder,
            hint_question: self.hints.question.clone(),
            hint_result: self.hints.result.clone(),
            highlight: self.hints.highlight,
            is_complete: self.is_complete(),
            regeneration_pending: self.pending.is_some(),
        }
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeSession")
            .field("problem", &self.problem)
            .field("answer_progress", &self.answer_progress)
            .field("position", &self.position)
            .field("move", &self.hints.mv)
            .field("remainder", &self.hints.remainder)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use trach_core::time::fixed_clock;

    fn session() -> PracticeSession {
        PracticeSession::new(PracticeConfig::default())
            .with_clock(fixed_clock())
            .with_seed(9)
    }

    fn started(multiplicand: u32, multiplier: u32) -> PracticeSession {
        let mut session = session();
        session.start_with(Problem::new(multiplicand, multiplier).unwrap());
        session
    }

    fn wrong_index(session: &PracticeSession) -> usize {
        (session.choices().correct_index() + 1) % 4
    }

    fn answer_correctly(session: &mut PracticeSession) -> AnswerResult {
        let index = session.choices().correct_index();
        session.submit_answer(index)
    }

    #[test]
    fn start_problem_initializes_first_digit() {
        let mut session = session();
        session.start_problem();

        let problem = *session.problem().unwrap();
        assert!(problem.is_valid());
        assert_eq!(session.position(), 0);
        assert_eq!(session.answer_progress(), "");
        assert_eq!(session.move_range(), MoveRange::new(0, 1));
        assert_eq!(session.current_move(), 0);
        assert_eq!(session.remainder(), 0);
        assert_eq!(session.hint_question(), "");
        assert_eq!(session.hint_result(), "");
        assert!(session.highlight().is_empty());
        assert_eq!(session.choices().correct_digit(), problem.digit_at(0));
    }

    #[test]
    fn wrong_answer_changes_nothing() {
        let mut session = started(1234, 567);
        session.advance_hint();
        let before = session.snapshot();

        let index = wrong_index(&session);
        let result = session.submit_answer(index);

        assert_eq!(
            result,
            AnswerResult {
                is_correct: false,
                is_complete: false
            }
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn correct_answer_carries_into_next_digit() {
        let mut session = started(1234, 567);
        session.hints.remainder = 25;

        let result = answer_correctly(&mut session);

        assert!(result.is_correct);
        assert!(!result.is_complete);
        assert_eq!(session.position(), 1);
        assert_eq!(session.answer_progress(), "8");
        assert_eq!(session.remainder(), 2);
        assert_eq!(session.hint_result(), "2 + ");
        assert_eq!(session.hint_question(), "");
        assert_eq!(session.move_range(), MoveRange::new(1, 4));
        assert_eq!(session.current_move(), 1);
        assert_eq!(session.choices().correct_digit(), 7);
    }

    #[test]
    fn small_remainder_seeds_no_carry() {
        let mut session = started(1234, 567);
        session.hints.remainder = 7;
        answer_correctly(&mut session);
        assert_eq!(session.remainder(), 0);
        assert_eq!(session.hint_result(), "");
    }

    #[test]
    fn hints_accumulate_and_stop_at_move_count() {
        let mut session = started(1234, 567);
        answer_correctly(&mut session);

        assert!(session.advance_hint());
        assert_eq!(session.hint_question(), "3 × 7");
        assert_eq!(session.hint_result(), "1 + ");
        assert_eq!(session.highlight().multiplicand, Some(2));
        assert_eq!(session.highlight().multiplier, Some(9));

        assert!(session.advance_hint());
        assert!(session.advance_hint());
        assert_eq!(session.hint_result(), "1 + 2 + 4");
        assert_eq!(session.remainder(), 7);
        assert_eq!(session.current_move(), 4);

        assert!(!session.advance_hint());
        assert_eq!(session.current_move(), 4);
        assert_eq!(session.hint_result(), "1 + 2 + 4");
    }

    #[test]
    fn solving_with_hints_reproduces_product() {
        let mut session = started(9999, 999);
        let problem = *session.problem().unwrap();

        while !session.is_complete() {
            while session.advance_hint() {}
            assert_eq!(
                u8::try_from(session.remainder() % 10).unwrap(),
                problem.digit_at(session.position())
            );
            answer_correctly(&mut session);
        }

        assert_eq!(session.answer_progress(), problem.product.to_string());
    }

    #[test]
    fn last_digit_completes_and_schedules_regeneration() {
        let mut session = started(1234, 567);
        let mut result = answer_correctly(&mut session);
        while !result.is_complete {
            result = answer_correctly(&mut session);
        }

        assert!(result.is_correct);
        assert_eq!(session.answer_progress(), "699678");
        assert_eq!(session.position(), 6);
        assert!(session.pending_regeneration().is_some());

        // Completed problems accept no further answers.
        let again = answer_correctly(&mut session);
        assert_eq!(
            again,
            AnswerResult {
                is_correct: false,
                is_complete: true
            }
        );
        assert_eq!(session.answer_progress(), "699678");
    }

    #[test]
    fn regeneration_fires_after_delay() {
        let mut session = started(1234, 567);
        while !answer_correctly(&mut session).is_complete {}

        assert!(!session.poll_regeneration());
        session
            .clock_mut()
            .advance(chrono::Duration::milliseconds(1_999));
        assert!(!session.poll_regeneration());
        session
            .clock_mut()
            .advance(chrono::Duration::milliseconds(1));
        assert!(session.poll_regeneration());

        assert_eq!(session.position(), 0);
        assert_eq!(session.answer_progress(), "");
        assert!(session.pending_regeneration().is_none());
    }

    #[test]
    fn reset_practice_cancels_regeneration() {
        let mut session = started(1234, 567);
        while !answer_correctly(&mut session).is_complete {}
        let ticket = session.pending_regeneration().unwrap().ticket;

        session.reset_practice();
        session
            .clock_mut()
            .advance(chrono::Duration::seconds(10));

        assert!(!session.poll_regeneration());
        assert!(!session.fire_regeneration(ticket));
        assert!(session.problem().is_none());
        assert_eq!(session.snapshot(), PracticeSnapshot::default());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut session = started(1234, 567);
        while !answer_correctly(&mut session).is_complete {}
        let first = session.pending_regeneration().unwrap().ticket;

        session.start_with(Problem::new(1111, 111).unwrap());
        while !answer_correctly(&mut session).is_complete {}
        let second = session.pending_regeneration().unwrap().ticket;
        assert_ne!(first, second);

        assert!(!session.fire_regeneration(first));
        assert_eq!(session.equation(), "1111 × 111");
        assert!(session.fire_regeneration(second));
        assert_ne!(session.answer_progress(), "123321");
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn reset_hints_keeps_answer_progress() {
        let mut session = started(1234, 567);
        answer_correctly(&mut session);
        session.advance_hint();

        session.reset_hints();

        assert_eq!(session.answer_progress(), "8");
        assert_eq!(session.position(), 1);
        assert_eq!(session.current_move(), 0);
        assert_eq!(session.move_range(), MoveRange::EMPTY);
        assert_eq!(session.remainder(), 0);
        assert_eq!(session.hint_question(), "");
        assert_eq!(session.hint_result(), "");
        assert!(!session.advance_hint());
    }

    #[test]
    fn empty_session_operations_are_no_ops() {
        let mut session = session();
        assert!(!session.advance_hint());
        assert_eq!(
            session.submit_answer(0),
            AnswerResult {
                is_correct: false,
                is_complete: false
            }
        );
        assert!(!session.is_complete());
        assert_eq!(session.equation(), "");
    }

    #[test]
    fn hint_gate_caps_requirement_at_step_count() {
        let config = PracticeConfig::default().with_min_hints_before_answer(3);
        let mut session = PracticeSession::new(config)
            .with_clock(fixed_clock())
            .with_seed(1);
        session.start_with(Problem::new(1234, 567).unwrap());
        let hints_on = PracticeSettings::default().with_hints_enabled(true);

        let gate = session.hint_gate(&hints_on);
        assert_eq!(gate, HintGate { viewed: 0, required: 1 });
        assert!(!gate.is_open());

        session.advance_hint();
        assert!(session.hint_gate(&hints_on).is_open());

        answer_correctly(&mut session);
        assert_eq!(
            session.hint_gate(&hints_on),
            HintGate { viewed: 0, required: 3 }
        );
        assert!(session.hint_gate(&PracticeSettings::default()).is_open());
    }
}
