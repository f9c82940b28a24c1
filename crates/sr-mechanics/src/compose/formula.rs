//! Formula text assembly.

use std::collections::BTreeMap;

use sr_dice::{Faces, Roll, Term};

use super::AdvantageMode;
use super::configure::{DamageDie, DamageDieMode};

/// The primary die spec, e.g. `1d20` or `2d20kh`.
pub fn die_spec(sides: u32, mode: AdvantageMode) -> String {
    keep_spec(mode.dice(), &sides.to_string(), mode)
}

/// The plot die spec, e.g. `1dp` or `2dpkh`.
pub fn plot_spec(mode: AdvantageMode) -> String {
    keep_spec(mode.dice(), "p", mode)
}

fn keep_spec(number: u32, faces: &str, mode: AdvantageMode) -> String {
    let keep = mode.keep().map(|k| k.to_string()).unwrap_or_default();
    format!("{number}d{faces}{keep}")
}

/// Join a die spec, a flat modifier, and extra fragments into one formula.
///
/// Terms are joined with `" + "`. Negative modifiers and fragments with a
/// leading `-` are joined with `" - "` instead. A zero modifier and blank
/// fragments are left out.
pub fn build(die: &str, base_modifier: i64, extra_parts: &[String]) -> String {
    let mut formula = die.trim().to_string();
    if base_modifier != 0 {
        push_term(&mut formula, &base_modifier.to_string());
    }
    for part in extra_parts {
        push_term(&mut formula, part);
    }
    formula
}

fn push_term(formula: &mut String, part: &str) {
    let part = part.trim();
    if let Some(negated) = part.strip_prefix('-') {
        formula.push_str(" - ");
        formula.push_str(negated.trim_start());
        return;
    }
    let part = part.strip_prefix('+').unwrap_or(part).trim_start();
    if part.is_empty() {
        return;
    }
    if formula.is_empty() {
        formula.push_str(part);
    } else {
        formula.push_str(" + ");
        formula.push_str(part);
    }
}

/// List the individual dice of a damage roll, tagged with the operand they
/// belong to. Dice inside a pool share the pool's index. Plot dice are
/// skipped.
pub fn damage_dice(roll: &Roll) -> Vec<DamageDie> {
    let mut dice = Vec::new();
    let mut operand = 0;
    for term in roll.terms() {
        let terms: Vec<_> = match term {
            Term::Operator(_) => continue,
            Term::Numeric(_) => Vec::new(),
            Term::Dice(d) => vec![d],
            Term::Pool(pool) => pool.rolls.iter().flat_map(Roll::dice).collect(),
        };
        for term in terms {
            if let Faces::Sides(faces) = term.faces {
                for _ in 0..term.number {
                    dice.push(DamageDie {
                        pool_index: operand,
                        faces,
                    });
                }
            }
        }
        operand += 1;
    }
    dice
}

/// Compile per-die advantage choices into a damage formula.
///
/// Each die becomes `1dN`, `2dNkh`, or `2dNkl`. Dice sharing a pool index
/// are grouped as `{a,b}`; groups are joined with `" + "` in pool order.
/// Returns `None` when no die has advantage or disadvantage.
pub fn advantage_override(modes: &[DamageDieMode]) -> Option<String> {
    if modes.iter().all(|m| m.mode == AdvantageMode::None) {
        return None;
    }
    let mut pools: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for m in modes {
        pools
            .entry(m.die.pool_index)
            .or_default()
            .push(die_spec(m.die.faces, m.mode));
    }
    let parts: Vec<String> = pools
        .into_values()
        .map(|pool| match pool.as_slice() {
            [single] => single.clone(),
            many => format!("{{{}}}", many.join(",")),
        })
        .collect();
    Some(parts.join(" + "))
}
