//! Damage rolls with their graze roll.

use sr_dice::data::references;
use sr_dice::{DieSource, EvalMode, Roll, RollData, Term, replace_formula_data};

use super::data::damage_data;
use super::{RollKind, RollOutcome};
use crate::config::RulesConfig;
use crate::error::{MechError, MechResult};
use crate::item::{DamageType, Item};
use crate::sheet::{ActorSheet, Attribute, Skill};

/// A damage roll to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRequest {
    /// Base formula, e.g. `"1d8"`.
    pub formula: String,
    /// Modifier appended as `+ mod`, when a skill or attribute applies.
    pub modifier: Option<i64>,
    /// Damage type.
    pub damage_type: Option<DamageType>,
    /// Graze formula; the rules default when `None`.
    pub graze_formula: Option<String>,
    /// Force every die to its maximum.
    pub critical: bool,
    /// Name of the item rolled.
    pub source: Option<String>,
}

impl DamageRequest {
    /// A plain damage roll of `formula`.
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            modifier: None,
            damage_type: None,
            graze_formula: None,
            critical: false,
            source: None,
        }
    }
}

/// Overrides for rolling an item's damage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageOptions {
    /// Skill whose rank adds to damage.
    pub skill: Option<Skill>,
    /// Attribute that adds to damage.
    pub attribute: Option<Attribute>,
    /// Formula replacing the item's damage formula.
    pub override_formula: Option<String>,
    /// Roll as a critical hit.
    pub critical: bool,
}

/// Resolve a damage request.
///
/// The primary roll is the formula plus the modifier. The graze roll sees
/// the primary roll's formula as `@damage.total`, without the modifier as
/// `@damage.unmodded`, and as dice only as `@damage.dice`. A graze formula
/// referencing `@damage` reuses the primary roll's die results instead of
/// rolling its own.
pub fn resolve(
    request: &DamageRequest,
    data: &RollData,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<RollOutcome> {
    let mode = if request.critical {
        EvalMode::Maximize
    } else {
        EvalMode::Normal
    };

    let base = match request.modifier {
        Some(modifier) => format!("{} + {modifier}", request.formula.trim()),
        None => request.formula.trim().to_string(),
    };
    let text = replace_formula_data(&base, data)?;
    let mut roll = Roll::parse_with_limits(&text, config.limits())?;
    roll.evaluate(source, mode)?;

    let mut unmodded = roll.clone();
    if let Some(modifier) = request.modifier {
        unmodded.remove_term_safely(|t| matches!(t, Term::Numeric(n) if n.value == modifier));
    }
    let mut dice_only = roll.clone();
    dice_only.filter_terms_safely(Term::is_dice_like);

    let mut graze_data = data.clone();
    graze_data.set("damage.total", roll.formula());
    graze_data.set("damage.unmodded", unmodded.formula());
    graze_data.set("damage.dice", dice_only.formula());

    let graze_formula = request
        .graze_formula
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(config.graze_formula.as_str());
    let shares_dice = references(graze_formula, "damage");

    let graze_text = replace_formula_data(graze_formula, &graze_data)?;
    let mut graze_roll = Roll::parse_with_limits(&graze_text, config.limits())?;
    if shares_dice {
        graze_roll.replace_die_results(&roll.dice());
    }
    graze_roll.evaluate(source, mode)?;

    let mut graze = RollOutcome::from_roll(RollKind::Damage, graze_roll)?;
    graze.is_critical = request.critical;
    graze.damage_type = request.damage_type;
    graze.shares_dice = shares_dice;
    graze.source = request.source.clone();

    let mut outcome = RollOutcome::from_roll(RollKind::Damage, roll)?;
    outcome.is_critical = request.critical;
    outcome.modifier = request.modifier;
    outcome.damage_type = request.damage_type;
    outcome.source = request.source.clone();
    outcome.graze = Some(Box::new(graze));

    tracing::debug!(
        formula = %outcome.formula,
        total = outcome.total,
        graze = ?outcome.graze_total(),
        critical = request.critical,
        "damage roll"
    );
    Ok(outcome)
}

/// Roll an item's damage for an actor.
///
/// The skill defaults to the item's activation skill and the attribute to
/// the activation attribute, then the skill's attribute on the sheet.
pub fn roll_damage(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &DamageOptions,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<RollOutcome> {
    let activation = item.activation();
    let skill = options.skill.or(activation.and_then(|a| a.skill));
    let attribute = options
        .attribute
        .or(activation.and_then(|a| a.attribute));
    let options = DamageOptions {
        skill,
        attribute,
        ..options.clone()
    };
    roll_item_damage(actor, item, &options, source, config)
        .inspect_err(|err| tracing::warn!(%err, item = %item.name, "damage roll aborted"))
}

/// Roll an item's damage with the skill and attribute taken as given.
///
/// A skill without an attribute rolls with the skill's attribute.
pub(crate) fn roll_item_damage(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &DamageOptions,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<RollOutcome> {
    let damage = item.damage().ok_or_else(|| MechError::NoRoll(item.name.clone()))?;
    let formula = item
        .damage_formula()
        .ok_or_else(|| MechError::NoRoll(item.name.clone()))?;
    let actor = actor.ok_or(MechError::MissingActorContext)?;

    let skill = options.skill;
    let attribute = options.attribute.or(skill.map(|s| actor.skill(s).attribute));
    let (data, modifier) = damage_data(actor, skill, attribute);

    let request = DamageRequest {
        formula: options
            .override_formula
            .clone()
            .unwrap_or_else(|| formula.to_string()),
        modifier,
        damage_type: damage.kind,
        graze_formula: damage.graze_override_formula.clone(),
        critical: options.critical,
        source: Some(item.name.clone()),
    };
    resolve(&request, &data, source, config)
}
