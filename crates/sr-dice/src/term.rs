//! Formula terms: dice, numbers, operators, and pools.
//!
//! A parsed formula is a flat sequence of [`Term`]s. Operators sit between
//! operands; a formula may start with a single `-` operator. Pools hold whole
//! sub-formulas and keep the best or worst of their totals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::plot;
use crate::roll::Roll;
use crate::source::DieSource;

/// How dice are sampled during evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalMode {
    /// Sample every die from the random source.
    #[default]
    Normal,
    /// Every die shows its lowest face.
    Minimize,
    /// Every die shows its highest face.
    Maximize,
}

/// The faces of a die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faces {
    /// A numbered die with the given number of sides.
    Sides(u32),
    /// The six-sided narrative plot die (`dp`).
    Plot,
}

impl Faces {
    /// The highest face of this die.
    pub fn max(self) -> u32 {
        match self {
            Self::Sides(n) => n,
            Self::Plot => plot::FACES,
        }
    }
}

impl fmt::Display for Faces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sides(n) => write!(f, "{n}"),
            Self::Plot => write!(f, "p"),
        }
    }
}

/// A keep modifier (`kh`, `kl`, optionally with a count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keep {
    /// Keep the highest `n` results.
    Highest(u32),
    /// Keep the lowest `n` results.
    Lowest(u32),
}

impl Keep {
    /// Number of results this modifier keeps.
    pub fn count(self) -> u32 {
        match self {
            Self::Highest(n) | Self::Lowest(n) => n,
        }
    }

    /// Returns the indices of `values` that are discarded by this modifier.
    ///
    /// Ties are broken in favour of the earlier result.
    pub fn discarded(self, values: &[i64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..values.len()).collect();
        match self {
            Self::Highest(_) => order.sort_by(|&a, &b| values[b].cmp(&values[a]).then(a.cmp(&b))),
            Self::Lowest(_) => order.sort_by(|&a, &b| values[a].cmp(&values[b]).then(a.cmp(&b))),
        }
        let keep = (self.count() as usize).min(values.len());
        let mut dropped = order.split_off(keep);
        dropped.sort_unstable();
        dropped
    }
}

impl fmt::Display for Keep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, n) = match self {
            Self::Highest(n) => ("kh", *n),
            Self::Lowest(n) => ("kl", *n),
        };
        if n == 1 {
            write!(f, "{tag}")
        } else {
            write!(f, "{tag}{n}")
        }
    }
}

/// The result of rolling a single die.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    /// The face that came up.
    pub face: u32,
    /// Dropped by a keep modifier; reported but not counted.
    #[serde(default)]
    pub discarded: bool,
    /// Marks a success value (opportunity).
    #[serde(default)]
    pub success: bool,
    /// Marks a failure value (complication).
    #[serde(default)]
    pub failure: bool,
    /// Weighted count attached to the result (plot die complications).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl DieResult {
    /// A plain result showing `face`.
    pub fn new(face: u32) -> Self {
        Self {
            face,
            ..Self::default()
        }
    }

    /// Returns true if this result counts toward the total.
    pub fn is_active(&self) -> bool {
        !self.discarded
    }
}

/// One or more dice of the same kind, e.g. `2d20kh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    /// How many dice are rolled.
    pub number: u32,
    /// The faces of each die.
    pub faces: Faces,
    /// Optional keep modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<Keep>,
    /// Results, empty until evaluated.
    #[serde(default)]
    pub results: Vec<DieResult>,
}

impl DiceTerm {
    /// An unevaluated dice term.
    pub fn new(number: u32, faces: Faces, keep: Option<Keep>) -> Self {
        Self {
            number,
            faces,
            keep,
            results: Vec::new(),
        }
    }

    /// Returns true if this is a plot die term.
    pub fn is_plot(&self) -> bool {
        self.faces == Faces::Plot
    }

    /// Returns true once every die has a result.
    pub fn is_evaluated(&self) -> bool {
        self.results.len() >= self.number as usize
    }

    /// Roll any dice that do not have a result yet, then apply the keep modifier.
    pub fn evaluate(&mut self, source: &mut dyn DieSource, mode: EvalMode) {
        let max = self.faces.max();
        while self.results.len() < self.number as usize {
            let face = match mode {
                EvalMode::Normal => source.face(max),
                EvalMode::Minimize => 1,
                EvalMode::Maximize => max,
            };
            self.results.push(DieResult::new(face));
        }
        self.results.truncate(self.number as usize);
        if self.is_plot() {
            for result in &mut self.results {
                plot::annotate(result);
            }
        }
        self.apply_keep();
    }

    /// Mark results dropped by the keep modifier as discarded.
    pub fn apply_keep(&mut self) {
        for result in &mut self.results {
            result.discarded = false;
        }
        let Some(keep) = self.keep else {
            return;
        };
        let faces: Vec<i64> = self.results.iter().map(|r| i64::from(r.face)).collect();
        for index in keep.discarded(&faces) {
            self.results[index].discarded = true;
        }
    }

    /// Force every result to the maximum face.
    pub fn maximize(&mut self) {
        let max = self.faces.max();
        for result in &mut self.results {
            result.face = max;
            if self.faces == Faces::Plot {
                plot::annotate(result);
            }
        }
        self.apply_keep();
    }

    /// Sum of the kept faces. Plot dice contribute nothing.
    pub fn total(&self) -> i64 {
        if self.is_plot() {
            return 0;
        }
        self.results
            .iter()
            .filter(|r| r.is_active())
            .map(|r| i64::from(r.face))
            .sum()
    }

    /// The first kept result, if any.
    pub fn first_active(&self) -> Option<&DieResult> {
        self.results.iter().find(|r| r.is_active())
    }

    /// Flag kept results at or above `success_at` as successes and at or
    /// below `failure_at` as failures. Discarded results carry no flags.
    pub fn mark_thresholds(&mut self, success_at: u32, failure_at: u32) {
        for result in &mut self.results {
            let active = result.is_active();
            result.success = active && result.face >= success_at;
            result.failure = active && result.face <= failure_at;
        }
    }

    /// True if the first kept result is a success.
    pub fn rolled_opportunity(&self) -> bool {
        self.first_active().is_some_and(|r| r.success)
    }

    /// True if the first kept result is a failure.
    pub fn rolled_complication(&self) -> bool {
        self.first_active().is_some_and(|r| r.failure)
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.number, self.faces)?;
        if let Some(keep) = self.keep {
            write!(f, "{keep}")?;
        }
        Ok(())
    }
}

/// A flat number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericTerm {
    /// The value of the term.
    pub value: i64,
}

impl NumericTerm {
    /// A numeric term with the given value.
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

/// An arithmetic operator between operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
}

impl Operator {
    /// Sign applied to the following operand.
    pub fn sign(self) -> i64 {
        match self {
            Self::Add => 1,
            Self::Subtract => -1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
        }
    }
}

/// The total of one pool member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolResult {
    /// Total of the member roll.
    pub total: i64,
    /// Dropped by the pool's keep modifier.
    #[serde(default)]
    pub discarded: bool,
}

/// A pool of sub-formulas, e.g. `{2d6kh,1d8}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTerm {
    /// Member rolls.
    pub rolls: Vec<Roll>,
    /// Optional keep modifier applied across member totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<Keep>,
    /// Member totals, empty until evaluated.
    #[serde(default)]
    pub results: Vec<PoolResult>,
}

impl PoolTerm {
    /// An unevaluated pool.
    pub fn new(rolls: Vec<Roll>, keep: Option<Keep>) -> Self {
        Self {
            rolls,
            keep,
            results: Vec::new(),
        }
    }

    /// Evaluate every member roll and apply the keep modifier to their totals.
    pub fn evaluate(&mut self, source: &mut dyn DieSource, mode: EvalMode) -> DiceResult<()> {
        let totals = self
            .rolls
            .iter_mut()
            .map(|roll| roll.evaluate_dyn(source, mode))
            .collect::<DiceResult<Vec<_>>>()?;
        self.set_results(totals);
        Ok(())
    }

    /// Recompute member totals from already evaluated members.
    pub fn reset_results(&mut self) -> DiceResult<()> {
        let totals = self
            .rolls
            .iter_mut()
            .map(Roll::reset_total)
            .collect::<DiceResult<Vec<_>>>()?;
        self.set_results(totals);
        Ok(())
    }

    fn set_results(&mut self, totals: Vec<i64>) {
        let dropped = self.keep.map(|k| k.discarded(&totals)).unwrap_or_default();
        self.results = totals
            .into_iter()
            .enumerate()
            .map(|(i, total)| PoolResult {
                total,
                discarded: dropped.contains(&i),
            })
            .collect();
    }

    /// Sum of the kept member totals.
    pub fn total(&self) -> DiceResult<i64> {
        self.results
            .iter()
            .filter(|r| !r.discarded)
            .try_fold(0i64, |sum, r| sum.checked_add(r.total))
            .ok_or(DiceError::Overflow)
    }
}

impl fmt::Display for PoolTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.rolls.iter().map(Roll::formula).collect();
        write!(f, "{{{}}}", members.join(","))?;
        if let Some(keep) = self.keep {
            write!(f, "{keep}")?;
        }
        Ok(())
    }
}

/// A single term of a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// Dice, e.g. `2d6`.
    Dice(DiceTerm),
    /// A flat number.
    Numeric(NumericTerm),
    /// `+` or `-`.
    Operator(Operator),
    /// A pool of sub-formulas.
    Pool(PoolTerm),
}

impl Term {
    /// Returns true for operator terms.
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    /// Returns true for terms that carry dice (dice terms and pools).
    pub fn is_dice_like(&self) -> bool {
        matches!(self, Self::Dice(_) | Self::Pool(_))
    }

    /// The numeric value of an evaluated operand. Operators have no value.
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Dice(d) => Some(d.total()),
            Self::Numeric(n) => Some(n.value),
            Self::Pool(p) => p.total().ok(),
            Self::Operator(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dice(d) => write!(f, "{d}"),
            Self::Numeric(n) => write!(f, "{}", n.value),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Pool(p) => write!(f, "{p}"),
        }
    }
}
