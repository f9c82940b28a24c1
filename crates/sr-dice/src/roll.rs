//! Rolls: parsed formulas, their evaluation, and term surgery.
//!
//! A [`Roll`] owns its term list. The formula text is always derived from the
//! terms, so editing terms (replacing results, dropping a modifier) keeps the
//! formula and the total consistent.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::lexer;
use crate::parser;
use crate::source::{DieSource, Scripted};
use crate::term::{DiceTerm, DieResult, EvalMode, Faces, Keep, NumericTerm, Operator, Term};

/// Limits applied when parsing a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of dice in a single dice term.
    pub max_dice: u32,
    /// Maximum number of faces on a die.
    pub max_faces: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_dice: 100,
            max_faces: 1000,
        }
    }
}

/// A dice formula and, once evaluated, its results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roll {
    terms: Vec<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<i64>,
}

impl Roll {
    /// Parse a formula with the default limits.
    pub fn parse(formula: &str) -> DiceResult<Self> {
        Self::parse_with_limits(formula, Limits::default())
    }

    /// Parse a formula, rejecting dice beyond `limits`.
    pub fn parse_with_limits(formula: &str, limits: Limits) -> DiceResult<Self> {
        let formula = formula.trim();
        if formula.is_empty() {
            return Err(DiceError::Empty);
        }

        let (tokens, lex_errors) = lexer::lex(formula);
        if let Some(err) = lex_errors.into_iter().next() {
            return Err(DiceError::Lex {
                formula: formula.to_string(),
                span: err.span,
                message: err.message,
            });
        }

        let terms = parser::parse(&tokens).map_err(|errors| {
            let (span, message) = errors
                .into_iter()
                .next()
                .map(|e| (e.span, e.message))
                .unwrap_or((0..formula.len(), "invalid formula".to_string()));
            DiceError::Parse {
                formula: formula.to_string(),
                span,
                message,
            }
        })?;

        validate(&terms, limits)?;
        Ok(Self::from_terms(terms))
    }

    /// An unevaluated roll over the given terms.
    pub fn from_terms(terms: Vec<Term>) -> Self {
        Self { terms, total: None }
    }

    /// The terms of this roll.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Mutable access to the terms. Call [`Roll::reset_total`] after editing
    /// an evaluated roll.
    pub fn terms_mut(&mut self) -> &mut Vec<Term> {
        &mut self.terms
    }

    /// The formula text derived from the terms, e.g. `"2d20kh + 5"`.
    ///
    /// A negative number after `+` renders as a subtraction, so `1d20 + -2`
    /// reads `1d20 - 2`. The term keeps its negative value.
    pub fn formula(&self) -> String {
        let mut out = String::new();
        let mut terms = self.terms.iter().enumerate().peekable();
        while let Some((i, term)) = terms.next() {
            match term {
                Term::Operator(Operator::Subtract) if i == 0 => out.push('-'),
                Term::Operator(Operator::Add) if i == 0 => {}
                Term::Operator(Operator::Add) => match terms.peek() {
                    Some((_, Term::Numeric(n))) if n.value < 0 => {
                        let _ = write!(out, " - {}", n.value.unsigned_abs());
                        terms.next();
                    }
                    _ => out.push_str(" + "),
                },
                Term::Operator(op) => {
                    let _ = write!(out, " {op} ");
                }
                other => {
                    let _ = write!(out, "{other}");
                }
            }
        }
        out
    }

    /// The total, if the roll has been evaluated.
    pub fn total(&self) -> Option<i64> {
        self.total
    }

    /// The total, or an error if the roll has not been evaluated.
    pub fn try_total(&self) -> DiceResult<i64> {
        self.total.ok_or(DiceError::NotEvaluated)
    }

    /// Returns true once the roll has a total.
    pub fn is_evaluated(&self) -> bool {
        self.total.is_some()
    }

    /// Roll every die without a result and compute the total.
    pub fn evaluate(&mut self, source: &mut impl DieSource, mode: EvalMode) -> DiceResult<i64> {
        let total = self.evaluate_dyn(source, mode)?;
        tracing::debug!(formula = %self, total, ?mode, "evaluated roll");
        Ok(total)
    }

    /// Object-safe form of [`Roll::evaluate`].
    pub fn evaluate_dyn(&mut self, source: &mut dyn DieSource, mode: EvalMode) -> DiceResult<i64> {
        for term in &mut self.terms {
            match term {
                Term::Dice(dice) => dice.evaluate(source, mode),
                Term::Pool(pool) => pool.evaluate(source, mode)?,
                Term::Numeric(_) | Term::Operator(_) => {}
            }
        }
        self.reset_total()
    }

    /// Recompute the total from the current term results.
    ///
    /// A total that does not fit in an `i64` leaves the roll unevaluated.
    pub fn reset_total(&mut self) -> DiceResult<i64> {
        self.total = None;
        let mut total: i64 = 0;
        let mut sign = 1;
        for term in &mut self.terms {
            let value = match term {
                Term::Operator(op) => {
                    sign = op.sign();
                    continue;
                }
                Term::Dice(dice) => dice.total(),
                Term::Numeric(n) => n.value,
                Term::Pool(pool) => {
                    pool.reset_results()?;
                    pool.total()?
                }
            };
            total = value
                .checked_mul(sign)
                .and_then(|v| total.checked_add(v))
                .ok_or(DiceError::Overflow)?;
            sign = 1;
        }
        self.total = Some(total);
        Ok(total)
    }

    /// Every dice term in order, including dice inside pools.
    pub fn dice(&self) -> Vec<&DiceTerm> {
        fn collect<'a>(terms: &'a [Term], out: &mut Vec<&'a DiceTerm>) {
            for term in terms {
                match term {
                    Term::Dice(dice) => out.push(dice),
                    Term::Pool(pool) => {
                        for roll in &pool.rolls {
                            collect(&roll.terms, out);
                        }
                    }
                    Term::Numeric(_) | Term::Operator(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.terms, &mut out);
        out
    }

    /// Mutable form of [`Roll::dice`].
    pub fn dice_mut(&mut self) -> Vec<&mut DiceTerm> {
        fn collect<'a>(terms: &'a mut [Term], out: &mut Vec<&'a mut DiceTerm>) {
            for term in terms {
                match term {
                    Term::Dice(dice) => out.push(dice),
                    Term::Pool(pool) => {
                        for roll in pool.rolls.iter_mut() {
                            collect(&mut roll.terms, out);
                        }
                    }
                    Term::Numeric(_) | Term::Operator(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&mut self.terms, &mut out);
        out
    }

    /// Every die result in order, including discarded ones.
    pub fn results(&self) -> Vec<DieResult> {
        self.dice()
            .into_iter()
            .flat_map(|d| d.results.iter().copied())
            .collect()
    }

    /// The first dice term with the given faces.
    pub fn find_dice(&self, faces: Faces) -> Option<&DiceTerm> {
        self.dice().into_iter().find(|d| d.faces == faces)
    }

    /// Mutable form of [`Roll::find_dice`].
    pub fn find_dice_mut(&mut self, faces: Faces) -> Option<&mut DiceTerm> {
        self.dice_mut().into_iter().find(|d| d.faces == faces)
    }

    /// Copy die faces from `source` into this roll's dice, term by term.
    ///
    /// Only as many faces as each target term rolls are copied. Dice left
    /// without a result are sampled on the next evaluation.
    pub fn replace_die_results(&mut self, source: &[&DiceTerm]) {
        for (target, from) in self.dice_mut().into_iter().zip(source) {
            target.results = from
                .results
                .iter()
                .take(target.number as usize)
                .map(|r| DieResult::new(r.face))
                .collect();
            target.apply_keep();
        }
        self.total = None;
    }

    /// Force every die to its maximum face and recompute the total.
    pub fn maximize(&mut self) -> DiceResult<i64> {
        for dice in self.dice_mut() {
            dice.maximize();
        }
        self.evaluate_dyn(&mut Scripted::default(), EvalMode::Maximize)
    }

    /// A copy of this roll with every result cleared.
    pub fn cleared(&self) -> Self {
        fn clear(terms: &mut [Term]) {
            for term in terms {
                match term {
                    Term::Dice(dice) => dice.results.clear(),
                    Term::Pool(pool) => {
                        pool.results.clear();
                        for roll in pool.rolls.iter_mut() {
                            roll.total = None;
                            clear(&mut roll.terms);
                        }
                    }
                    Term::Numeric(_) | Term::Operator(_) => {}
                }
            }
        }
        let mut roll = self.clone();
        roll.total = None;
        clear(&mut roll.terms);
        roll
    }

    /// Remove the first operand matching `predicate` together with the
    /// operator attached to it. Returns true if a term was removed.
    ///
    /// The roll always keeps at least one term: an emptied roll becomes `0`.
    pub fn remove_term_safely(&mut self, predicate: impl Fn(&Term) -> bool) -> bool {
        let mut groups = operand_groups(std::mem::take(&mut self.terms));
        let removed = match groups.iter().position(|(_, term)| predicate(term)) {
            Some(index) => {
                groups.remove(index);
                true
            }
            None => false,
        };
        self.terms = from_groups(groups);
        self.after_edit();
        removed
    }

    /// Keep only the operands matching `predicate`, with their operators.
    ///
    /// The roll always keeps at least one term: an emptied roll becomes `0`.
    pub fn filter_terms_safely(&mut self, predicate: impl Fn(&Term) -> bool) {
        let groups = operand_groups(std::mem::take(&mut self.terms))
            .into_iter()
            .filter(|(_, term)| predicate(term))
            .collect();
        self.terms = from_groups(groups);
        self.after_edit();
    }

    fn after_edit(&mut self) {
        if self.terms.is_empty() {
            self.terms.push(Term::Numeric(NumericTerm::new(0)));
        }
        if self.total.is_none() {
            return;
        }
        if let Err(err) = self.reset_total() {
            tracing::warn!(%err, formula = %self, "total lost after edit");
        }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula())
    }
}

/// Pair every operand with the operator in front of it.
fn operand_groups(terms: Vec<Term>) -> Vec<(Operator, Term)> {
    let mut groups = Vec::new();
    let mut pending = Operator::Add;
    for term in terms {
        match term {
            Term::Operator(op) => pending = op,
            operand => {
                groups.push((pending, operand));
                pending = Operator::Add;
            }
        }
    }
    groups
}

fn from_groups(groups: Vec<(Operator, Term)>) -> Vec<Term> {
    let mut terms = Vec::with_capacity(groups.len() * 2);
    for (i, (op, term)) in groups.into_iter().enumerate() {
        if i > 0 || op == Operator::Subtract {
            terms.push(Term::Operator(op));
        }
        terms.push(term);
    }
    terms
}

fn validate(terms: &[Term], limits: Limits) -> DiceResult<()> {
    for term in terms {
        match term {
            Term::Dice(dice) => {
                match dice.faces {
                    Faces::Sides(n) if n == 0 || n > limits.max_faces => {
                        return Err(DiceError::InvalidDie(n));
                    }
                    _ => {}
                }
                if dice.number > limits.max_dice {
                    return Err(DiceError::TooManyDice {
                        count: dice.number,
                        limit: limits.max_dice,
                    });
                }
                check_keep(dice.keep, dice.number)?;
            }
            Term::Pool(pool) => {
                check_keep(pool.keep, pool.rolls.len() as u32)?;
                for roll in &pool.rolls {
                    validate(&roll.terms, limits)?;
                }
            }
            Term::Numeric(_) | Term::Operator(_) => {}
        }
    }
    Ok(())
}

fn check_keep(keep: Option<Keep>, count: u32) -> DiceResult<()> {
    match keep {
        Some(k) if k.count() == 0 || k.count() > count => Err(DiceError::InvalidKeep {
            keep: k.count(),
            count,
        }),
        _ => Ok(()),
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn single_d20_total_is_face_plus_modifier(face in 1u32..=20, modifier in -10i64..=10) {
            let formula = if modifier < 0 {
                format!("1d20 - {}", -modifier)
            } else {
                format!("1d20 + {modifier}")
            };
            let mut roll = Roll::parse(&formula).unwrap();
            let total = roll.evaluate(&mut Scripted::new([face]), EvalMode::Normal);
            prop_assert_eq!(total, Ok(i64::from(face) + modifier));
        }

        #[test]
        fn keep_highest_is_max_of_pair(a in 1u32..=20, b in 1u32..=20) {
            let mut roll = Roll::parse("2d20kh").unwrap();
            let total = roll.evaluate(&mut Scripted::new([a, b]), EvalMode::Normal);
            prop_assert_eq!(total, Ok(i64::from(a.max(b))));
        }

        #[test]
        fn keep_lowest_is_min_of_pair(a in 1u32..=20, b in 1u32..=20) {
            let mut roll = Roll::parse("2d20kl").unwrap();
            let total = roll.evaluate(&mut Scripted::new([a, b]), EvalMode::Normal);
            prop_assert_eq!(total, Ok(i64::from(a.min(b))));
        }
    }
}
