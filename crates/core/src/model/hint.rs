use serde::{Deserialize, Serialize};

//
// ─── MOVE RANGE ────────────────────────────────────────────────────────────────
//

/// Half-open interval `[start_move, move_count)` of global move numbers owned
/// by one digit position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRange {
    pub start_move: usize,
    pub move_count: usize,
}

impl MoveRange {
    /// The range that owns no moves.
    pub const EMPTY: Self = Self {
        start_move: 0,
        move_count: 0,
    };

    #[must_use]
    pub fn new(start_move: usize, move_count: usize) -> Self {
        Self {
            start_move,
            move_count,
        }
    }

    /// Number of teaching steps in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.move_count.saturating_sub(self.start_move)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, mv: usize) -> bool {
        (self.start_move..self.move_count).contains(&mv)
    }

    /// Index of `mv` relative to the start of the range.
    #[must_use]
    pub fn local_step(&self, mv: usize) -> Option<usize> {
        self.contains(mv).then(|| mv - self.start_move)
    }

    /// True when `mv` is the last move of the range.
    #[must_use]
    pub fn is_final(&self, mv: usize) -> bool {
        self.contains(mv) && mv + 1 == self.move_count
    }
}

//
// ─── DIGIT PAIR ────────────────────────────────────────────────────────────────
//

/// Right-to-left digit offsets into each operand for one teaching step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitPair {
    pub multiplicand_index: usize,
    pub multiplier_index: usize,
}

impl DigitPair {
    #[must_use]
    pub fn new(multiplicand_index: usize, multiplier_index: usize) -> Self {
        Self {
            multiplicand_index,
            multiplier_index,
        }
    }
}

//
// ─── HINT STEP ─────────────────────────────────────────────────────────────────
//

/// Which character of the two-digit product a step contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductHalf {
    /// Second character, e.g. `1` of `"21"`.
    #[default]
    Units,
    /// First character, e.g. `2` of `"21"`.
    Tens,
}

/// Character offsets into the `"<multiplicand> × <multiplier>"` display text.
///
/// `None` means there is nothing to highlight: the digit came from zero
/// padding, or the equation text could not be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightOffsets {
    pub multiplicand: Option<usize>,
    pub multiplier: Option<usize>,
}

impl HighlightOffsets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.multiplicand.is_none() && self.multiplier.is_none()
    }

    /// Offsets that are present, in display order.
    #[must_use]
    pub fn offsets(&self) -> Vec<usize> {
        self.multiplicand.into_iter().chain(self.multiplier).collect()
    }
}

/// One atomic teaching step: multiply two operand digits and fold one half of
/// the product into the running sum for the current digit position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintStep {
    /// e.g. `"4 × 7"`.
    pub question: String,
    pub pair: DigitPair,
    pub multiplicand_digit: u8,
    pub multiplier_digit: u8,
    /// Zero-padded two-character product, `"00"`..=`"81"`.
    pub product: String,
    pub half: ProductHalf,
    pub digit_to_add: u8,
    pub new_remainder: u32,
    /// The digit alone on the final step, otherwise the digit followed by `" + "`.
    pub result_display: String,
    pub is_final: bool,
    pub highlight: HighlightOffsets,
}
