//! Error types for formula parsing and evaluation.

use std::ops::Range;

/// Errors that can occur while parsing or evaluating a dice formula.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// The formula contains a character sequence that is not a token.
    #[error("invalid formula '{formula}': {message}")]
    Lex {
        /// The formula being lexed.
        formula: String,
        /// Byte range of the offending input.
        span: Range<usize>,
        /// Human-readable description.
        message: String,
    },

    /// The token stream does not form a valid formula.
    #[error("invalid formula '{formula}': {message}")]
    Parse {
        /// The formula being parsed.
        formula: String,
        /// Byte range of the offending input.
        span: Range<usize>,
        /// Human-readable description.
        message: String,
    },

    /// The formula is empty.
    #[error("empty formula")]
    Empty,

    /// An `@reference` has no value in the roll data.
    #[error("unresolved reference: @{0}")]
    UnresolvedReference(String),

    /// A die has an unsupported number of faces.
    #[error("invalid die: d{0}")]
    InvalidDie(u32),

    /// A dice term asks for more dice than allowed.
    #[error("too many dice: {count} (limit {limit})")]
    TooManyDice {
        /// The requested number of dice.
        count: u32,
        /// The configured limit.
        limit: u32,
    },

    /// A keep modifier keeps more results than are rolled.
    #[error("cannot keep {keep} of {count} results")]
    InvalidKeep {
        /// Number of results to keep.
        keep: u32,
        /// Number of results rolled.
        count: u32,
    },

    /// A total was requested from a roll that has not been evaluated.
    #[error("roll has not been evaluated")]
    NotEvaluated,

    /// The total does not fit in a 64-bit integer.
    #[error("total out of range")]
    Overflow,
}

impl DiceError {
    /// Byte range in the formula that caused the error, if known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Lex { span, .. } | Self::Parse { span, .. } => Some(span.clone()),
            _ => None,
        }
    }
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
