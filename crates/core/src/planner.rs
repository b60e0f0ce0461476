//! Maps answer digit positions to the moves that derive them.
//!
//! Every digit of the product is built from a diagonal sweep over the
//! operands: start at `(position, 0)`, then alternately step the multiplicand
//! index down and the multiplier index up. Even local steps take the units
//! half of a digit product, odd local steps take the tens half of the product
//! one place to the right.

use tracing::warn;

use crate::model::{DigitPair, MAX_ANSWER_DIGITS, MoveRange};

/// The multiplier has three digits, so a sweep never needs more than six steps.
pub const MAX_STEPS_PER_POSITION: usize = 6;

/// Number of teaching steps for `position`: `min(2p + 1, 6)`.
///
/// Positions outside `0..MAX_ANSWER_DIGITS` own no steps.
#[must_use]
pub fn steps_for(position: usize) -> usize {
    if position >= MAX_ANSWER_DIGITS {
        return 0;
    }
    (2 * position + 1).min(MAX_STEPS_PER_POSITION)
}

/// Global move range owned by `position`.
///
/// Bounds are the running totals of [`steps_for`]: `[0, 1, 4, 9, 15, 21, 27, 33]`.
/// Out-of-range positions get [`MoveRange::EMPTY`].
#[must_use]
pub fn move_range_for(position: usize) -> MoveRange {
    if position >= MAX_ANSWER_DIGITS {
        return MoveRange::EMPTY;
    }
    let start_move: usize = (0..position).map(steps_for).sum();
    MoveRange::new(start_move, start_move + steps_for(position))
}

/// Right-to-left operand offsets to multiply for global move `mv` at `position`.
///
/// With local step `k = mv - start_move`, the pair is
/// `(position - ceil(k / 2), floor(k / 2))`. Moves outside the position's
/// range return `(0, 0)` and log a warning.
#[must_use]
pub fn digit_pair_for(mv: usize, position: usize) -> DigitPair {
    let range = move_range_for(position);
    let Some(k) = range.local_step(mv) else {
        warn!(mv, position, ?range, "move outside digit position range");
        return DigitPair::default();
    };
    sweep_pair(position, k)
}

/// Every pair visited by `position`, in teaching order.
#[must_use]
pub fn sweep_for(position: usize) -> Vec<DigitPair> {
    (0..steps_for(position))
        .map(|k| sweep_pair(position, k))
        .collect()
}

fn sweep_pair(position: usize, k: usize) -> DigitPair {
    // k < 2 * position + 1, so ceil(k / 2) <= position.
    DigitPair::new(position - k.div_ceil(2), k / 2)
}
