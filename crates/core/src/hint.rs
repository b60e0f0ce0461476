//! Computes one teaching step of the cross-multiplication method.

use tracing::warn;

use crate::model::{
    DigitPair, Equation, HighlightOffsets, HintStep, ProductHalf, SEPARATOR_CHARS,
    digit_from_right,
};
use crate::planner;

/// Compute the hint for global move `mv` while solving answer digit `position`.
///
/// `remainder_in` is the running sum so far (seeded with the carry from the
/// previous position). Malformed equation text or indices that fall outside
/// the operands never fail: the affected digits read as zero and a warning is
/// logged.
#[must_use]
pub fn calculate_step(equation: &str, mv: usize, position: usize, remainder_in: u32) -> HintStep {
    let range = planner::move_range_for(position);
    let is_final = range.is_final(mv);

    let parsed = match Equation::parse(equation) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%err, mv, position, "cannot build hint from equation text");
            return fallback_step(remainder_in, is_final);
        }
    };

    let pair = planner::digit_pair_for(mv, position);
    let local_step = range.local_step(mv).unwrap_or_default();

    let padded = parsed.padded_multiplicand(position + 1);
    let padding = padded.len() - parsed.multiplicand().len();

    let (multiplicand_digit, multiplicand_offset) =
        match digit_from_right(&padded, pair.multiplicand_index) {
            Some((index, digit)) => (digit, index.checked_sub(padding)),
            None => {
                warn!(?pair, equation, "multiplicand index outside operand");
                (0, None)
            }
        };

    let (multiplier_digit, multiplier_offset) =
        match digit_from_right(parsed.multiplier(), pair.multiplier_index) {
            Some((index, digit)) => (
                digit,
                Some(index + parsed.multiplicand().len() + SEPARATOR_CHARS),
            ),
            None => {
                warn!(?pair, equation, "multiplier index outside operand");
                (0, None)
            }
        };

    let product = multiplicand_digit * multiplier_digit;
    let half = if local_step % 2 == 0 {
        ProductHalf::Units
    } else {
        ProductHalf::Tens
    };
    let digit_to_add = match half {
        ProductHalf::Units => product % 10,
        ProductHalf::Tens => product / 10,
    };

    HintStep {
        question: format!("{multiplicand_digit} × {multiplier_digit}"),
        pair,
        multiplicand_digit,
        multiplier_digit,
        product: format!("{product:02}"),
        half,
        digit_to_add,
        new_remainder: remainder_in.saturating_add(u32::from(digit_to_add)),
        result_display: result_display(digit_to_add, is_final),
        is_final,
        highlight: HighlightOffsets {
            multiplicand: multiplicand_offset,
            multiplier: multiplier_offset,
        },
    }
}

fn result_display(digit: u8, is_final: bool) -> String {
    if is_final {
        digit.to_string()
    } else {
        format!("{digit} + ")
    }
}

fn fallback_step(remainder_in: u32, is_final: bool) -> HintStep {
    HintStep {
        question: "0 × 0".to_owned(),
        pair: DigitPair::default(),
        product: "00".to_owned(),
        new_remainder: remainder_in,
        result_display: result_display(0, is_final),
        is_final,
        ..HintStep::default()
    }
}
