//! The plot die: a six-sided narrative die layered onto skill tests.
//!
//! Faces 1 and 2 are complications, weighted by twice their face value.
//! Faces 5 and 6 are opportunities. Faces 3 and 4 are blank. The plot die
//! never adds to a roll's numeric total.

use crate::source::DieSource;
use crate::term::{DiceTerm, DieResult, EvalMode, Faces, Keep};

/// Number of faces on the plot die.
pub const FACES: u32 = 6;

/// Set the success/failure flags and weighted count for a plot die result.
pub fn annotate(result: &mut DieResult) {
    result.success = false;
    result.failure = false;
    if result.face <= 2 {
        result.failure = true;
        result.count = Some(result.face * 2);
    } else {
        result.success = result.face >= 5;
        result.count = Some(0);
    }
}

/// Roll a single plot die.
///
/// Minimize shows a face of 1 and maximize a face of 6 without sampling.
pub fn roll(source: &mut dyn DieSource, mode: EvalMode) -> DieResult {
    let face = match mode {
        EvalMode::Normal => source.face(FACES),
        EvalMode::Minimize => 1,
        EvalMode::Maximize => FACES,
    };
    let mut result = DieResult::new(face);
    annotate(&mut result);
    result
}

/// An unevaluated plot die term; two dice with a keep modifier when rolled
/// with advantage (`Keep::Highest`) or disadvantage (`Keep::Lowest`).
pub fn term(keep: Option<Keep>) -> DiceTerm {
    let number = if keep.is_some() { 2 } else { 1 };
    DiceTerm::new(number, Faces::Plot, keep)
}
