use rand::Rng;
use serde::Serialize;
use tracing::warn;

/// Number of buttons offered per digit.
pub const ANSWER_CHOICES: usize = 4;

/// Four distinct digits, one of which is the answer.
///
/// Only [`generate_choices`] builds a populated set, so `correct_index` is
/// always a valid slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnswerChoices {
    digits: [u8; ANSWER_CHOICES],
    correct_index: usize,
}

impl AnswerChoices {
    #[must_use]
    pub fn digits(&self) -> [u8; ANSWER_CHOICES] {
        self.digits
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// The digit in the correct slot.
    #[must_use]
    pub fn correct_digit(&self) -> u8 {
        self.digits.get(self.correct_index).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_correct(&self, choice_index: usize) -> bool {
        choice_index == self.correct_index
    }
}

/// Place `correct_digit` in a random slot and fill the rest with distinct
/// random digits.
///
/// Each slot gets up to `retry_budget` random draws. If none is free, the
/// first unused digit from `0..=9` is taken, so this always terminates.
/// `correct_digit` values above 9 are reduced modulo 10.
pub fn generate_choices<R: Rng + ?Sized>(
    rng: &mut R,
    correct_digit: u8,
    retry_budget: u32,
) -> AnswerChoices {
    let correct_digit = correct_digit % 10;
    let correct_index = rng.random_range(0..ANSWER_CHOICES);

    let mut taken = [false; 10];
    taken[usize::from(correct_digit)] = true;

    let mut digits = [correct_digit; ANSWER_CHOICES];
    for (slot, digit) in digits.iter_mut().enumerate() {
        if slot == correct_index {
            continue;
        }
        let picked = (0..retry_budget)
            .map(|_| rng.random_range(0..10_u8))
            .find(|candidate| !taken[usize::from(*candidate)])
            .or_else(|| {
                warn!(slot, retry_budget, "random choice draws exhausted, scanning");
                (0..10_u8).find(|candidate| !taken[usize::from(*candidate)])
            })
            .unwrap_or(correct_digit);
        taken[usize::from(picked)] = true;
        *digit = picked;
    }

    AnswerChoices {
        digits,
        correct_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::capture_warnings;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn assert_well_formed(choices: &AnswerChoices, correct: u8) {
        let unique: HashSet<u8> = choices.digits.iter().copied().collect();
        assert_eq!(unique.len(), ANSWER_CHOICES, "{choices:?}");
        assert!(choices.digits.iter().all(|d| *d <= 9));
        assert_eq!(choices.correct_digit(), correct);
        assert_eq!(
            choices.digits.iter().filter(|d| **d == correct).count(),
            1
        );
    }

    #[test]
    fn many_trials_stay_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        for trial in 0..500 {
            let correct = u8::try_from(trial % 10).unwrap();
            let choices = generate_choices(&mut rng, correct, 32);
            assert_well_formed(&choices, correct);
        }
    }

    #[test]
    fn correct_slot_varies() {
        let mut rng = StdRng::seed_from_u64(11);
        let slots: HashSet<usize> = (0..200)
            .map(|_| generate_choices(&mut rng, 5, 32).correct_index)
            .collect();
        assert_eq!(slots.len(), ANSWER_CHOICES);
    }

    /// Always yields the same value, so random draws collide after the first.
    struct StuckRng;

    impl rand::RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn slots_outside_the_set_are_never_correct() {
        let mut rng = StdRng::seed_from_u64(8);
        let choices = generate_choices(&mut rng, 6, 32);
        assert!(choices.correct_index() < ANSWER_CHOICES);
        assert_eq!(choices.digits()[choices.correct_index()], 6);
        assert!(!choices.is_correct(ANSWER_CHOICES));
        assert!(!choices.is_correct(usize::MAX));
    }

    #[test]
    fn empty_set_reads_as_zero() {
        let choices = AnswerChoices::default();
        assert_eq!(choices.correct_digit(), 0);
        assert_eq!(choices.digits(), [0; ANSWER_CHOICES]);
    }

    #[test]
    fn exhausted_draws_fall_back_to_scan() {
        let (choices, logs) = capture_warnings(|| generate_choices(&mut StuckRng, 0, 4));
        assert_well_formed(&choices, 0);
        assert!(logs.contains("random choice draws exhausted"), "{logs}");
    }

    proptest! {
        #[test]
        fn every_digit_gets_a_valid_set(correct in 0u8..10, seed in any::<u64>(), budget in 1u32..40) {
            let mut rng = StdRng::seed_from_u64(seed);
            let choices = generate_choices(&mut rng, correct, budget);
            assert_well_formed(&choices, correct);
        }
    }
}
