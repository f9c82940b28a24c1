//! Dice formulas for Stormroll.
//!
//! Parses formulas such as `2d20kh + 3 + 1dp` or `{2d6,1d8}kh` into a
//! [`Roll`], evaluates them against a [`DieSource`], and supports the term
//! surgery that damage rolls need (dropping modifiers, copying die results
//! between rolls, maximizing for critical hits).

pub mod data;
/// Formula error rendering.
pub mod diagnostics;
pub mod error;
/// Formula tokenizer.
pub mod lexer;
/// Formula parser.
pub mod parser;
pub mod plot;
pub mod roll;
pub mod source;
pub mod term;

pub use data::{DataValue, RollData, replace_formula_data};
pub use diagnostics::render_formula_error;
pub use error::{DiceError, DiceResult};
pub use roll::{Limits, Roll};
pub use source::{DieSource, RngSource, Scripted};
pub use term::{
    DiceTerm, DieResult, EvalMode, Faces, Keep, NumericTerm, Operator, PoolResult, PoolTerm, Term,
};
