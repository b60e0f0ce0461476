use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::equation::MULTIPLICATION_SIGN;

//
// ─── BOUNDS ────────────────────────────────────────────────────────────────────
//

/// Smallest allowed multiplicand (four digits).
pub const MULTIPLICAND_MIN: u32 = 1_000;
/// Largest allowed multiplicand.
pub const MULTIPLICAND_MAX: u32 = 9_999;
/// Smallest allowed multiplier (three digits).
pub const MULTIPLIER_MIN: u32 = 100;
/// Largest allowed multiplier.
pub const MULTIPLIER_MAX: u32 = 999;

/// Widest possible product (`9999 × 999 = 9_989_001`).
pub const MAX_ANSWER_DIGITS: usize = 7;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("multiplicand must be in {MULTIPLICAND_MIN}..={MULTIPLICAND_MAX}, got {0}")]
    MultiplicandOutOfRange(u32),

    #[error("multiplier must be in {MULTIPLIER_MIN}..={MULTIPLIER_MAX}, got {0}")]
    MultiplierOutOfRange(u32),
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// A single multiplication exercise: a four-digit multiplicand times a
/// three-digit multiplier.
///
/// Problems are plain values. A session replaces its problem wholesale
/// instead of mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub multiplicand: u32,
    pub multiplier: u32,
    pub product: u32,
}

impl Problem {
    /// Build a problem from its operands, computing the product.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError` if either operand is outside its digit-count bounds.
    pub fn new(multiplicand: u32, multiplier: u32) -> Result<Self, ProblemError> {
        if !(MULTIPLICAND_MIN..=MULTIPLICAND_MAX).contains(&multiplicand) {
            return Err(ProblemError::MultiplicandOutOfRange(multiplicand));
        }
        if !(MULTIPLIER_MIN..=MULTIPLIER_MAX).contains(&multiplier) {
            return Err(ProblemError::MultiplierOutOfRange(multiplier));
        }
        Ok(Self {
            multiplicand,
            multiplier,
            product: multiplicand * multiplier,
        })
    }

    /// Checks the range and consistency invariants.
    ///
    /// Fields are public, so a hand-built `Problem` can violate them.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (MULTIPLICAND_MIN..=MULTIPLICAND_MAX).contains(&self.multiplicand)
            && (MULTIPLIER_MIN..=MULTIPLIER_MAX).contains(&self.multiplier)
            && self.multiplicand.checked_mul(self.multiplier) == Some(self.product)
    }

    /// Display text, e.g. `"1234 × 567"`.
    #[must_use]
    pub fn equation(&self) -> String {
        self.to_string()
    }

    /// Number of decimal digits in the product.
    #[must_use]
    pub fn digit_count(&self) -> usize {
        decimal_len(self.product)
    }

    /// Product digit at `position`, counted from the right (0 = ones).
    ///
    /// Positions past the most significant digit read as 0.
    #[must_use]
    pub fn digit_at(&self, position: usize) -> u8 {
        let Ok(exp) = u32::try_from(position) else {
            return 0;
        };
        match 10_u32.checked_pow(exp) {
            // Truncation is fine: the value is always < 10.
            #[allow(clippy::cast_possible_truncation)]
            Some(scale) => ((self.product / scale) % 10) as u8,
            None => 0,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.multiplicand, MULTIPLICATION_SIGN, self.multiplier
        )
    }
}

fn decimal_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 10 {
        value /= 10;
        len += 1;
    }
    len
}
