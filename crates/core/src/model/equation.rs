use thiserror::Error;

/// Separator between operands in equation text.
pub const MULTIPLICATION_SIGN: &str = " × ";

/// Older equation text used an ASCII star.
const ASCII_SIGN: &str = " * ";

/// Width of the separator in characters (not bytes).
pub const SEPARATOR_CHARS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EquationError {
    #[error("equation has no ` × ` separator: {0:?}")]
    MissingSeparator(String),

    #[error("equation operand is empty")]
    EmptyOperand,

    #[error("equation operand is not all digits: {0:?}")]
    NonDigit(String),
}

/// Operand digit strings parsed out of equation text such as `"1234 × 567"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    multiplicand: String,
    multiplier: String,
}

impl Equation {
    /// Parse `"<digits> × <digits>"` (or the `*` form).
    ///
    /// # Errors
    ///
    /// Returns `EquationError` if there is no separator, an operand is empty,
    /// or an operand contains anything but ASCII digits.
    pub fn parse(text: &str) -> Result<Self, EquationError> {
        let (left, right) = text
            .split_once(MULTIPLICATION_SIGN)
            .or_else(|| text.split_once(ASCII_SIGN))
            .ok_or_else(|| EquationError::MissingSeparator(text.to_owned()))?;

        Ok(Self {
            multiplicand: parse_operand(left)?,
            multiplier: parse_operand(right)?,
        })
    }

    #[must_use]
    pub fn multiplicand(&self) -> &str {
        &self.multiplicand
    }

    #[must_use]
    pub fn multiplier(&self) -> &str {
        &self.multiplier
    }

    /// Multiplicand left-padded with zeros to at least `width` digits.
    #[must_use]
    pub fn padded_multiplicand(&self, width: usize) -> String {
        format!("{:0>width$}", self.multiplicand)
    }
}

fn parse_operand(raw: &str) -> Result<String, EquationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EquationError::EmptyOperand);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EquationError::NonDigit(raw.to_owned()));
    }
    Ok(raw.to_owned())
}

/// Digit `offset` places from the right of an ASCII digit string.
pub(crate) fn digit_from_right(digits: &str, offset: usize) -> Option<(usize, u8)> {
    let bytes = digits.as_bytes();
    let index = bytes.len().checked_sub(offset + 1)?;
    let byte = *bytes.get(index)?;
    byte.is_ascii_digit().then(|| (index, byte - b'0'))
}
