//! Attacks: a skill test and a damage roll configured together.

use serde::{Deserialize, Serialize};
use sr_dice::{DieSource, Roll, replace_formula_data};

use super::configure::RollConfigurator;
use super::damage::{DamageOptions, roll_item_damage};
use super::data::{damage_data, skill_test_data};
use super::{AdvantageMode, AttackPrompt, RollKind, RollOutcome, RollRequest, formula, skill_test};
use crate::config::RulesConfig;
use crate::error::{MechError, MechResult};
use crate::item::{Activation, Item};
use crate::sheet::{ActorSheet, Attribute, Skill};

/// Overrides for an attack. Unset fields fall back to the item, then to
/// the rules configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackOptions {
    /// Skill tested.
    pub skill: Option<Skill>,
    /// Attribute the test rolls with.
    pub attribute: Option<Attribute>,
    /// Skill whose rank adds to damage.
    pub damage_skill: Option<Skill>,
    /// Attribute that adds to damage.
    pub damage_attribute: Option<Attribute>,
    /// Advantage on the d20.
    pub advantage_mode: Option<AdvantageMode>,
    /// Roll the plot die.
    pub plot_die: Option<bool>,
    /// Advantage on the plot die.
    pub plot_advantage_mode: Option<AdvantageMode>,
    /// Formula fragments for the test; the item's modifier formula if unset.
    pub parts: Option<Vec<String>>,
    /// Opportunity threshold.
    pub opportunity: Option<u32>,
    /// Complication threshold.
    pub complication: Option<u32>,
    /// Roll damage as a critical hit.
    pub critical: bool,
}

/// The rolls of one attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// The skill test, unless the item deals damage without a test.
    pub skill_test: Option<RollOutcome>,
    /// The damage roll, unless the item deals no damage.
    pub damage: Option<RollOutcome>,
}

impl AttackOutcome {
    /// Every roll, skill test first.
    pub fn rolls(&self) -> impl Iterator<Item = &RollOutcome> {
        self.skill_test.iter().chain(self.damage.iter())
    }

    /// Consume the outcome into its rolls, skill test first.
    pub fn into_rolls(self) -> Vec<RollOutcome> {
        self.skill_test.into_iter().chain(self.damage).collect()
    }
}

/// Roll an attack with an item.
///
/// The configurator is asked once, before any die is sampled; dismissing it
/// cancels the attack. The test leg is skipped when the item's activation is
/// not a skill test, and the damage leg when the item has no damage formula.
pub fn roll_attack(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &AttackOptions,
    configurator: &mut dyn RollConfigurator,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<AttackOutcome> {
    attack(actor, item, options, configurator, source, config)
        .inspect_err(|err| tracing::warn!(%err, item = %item.name, "attack aborted"))
}

fn attack(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &AttackOptions,
    configurator: &mut dyn RollConfigurator,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<AttackOutcome> {
    let activation = item.activation();
    let test_activation = activation.filter(|a| a.is_skill_test());
    let damage_formula = item.damage_formula();
    if test_activation.is_none() && damage_formula.is_none() {
        return Err(MechError::NoRoll(item.name.clone()));
    }
    let actor = actor.ok_or(MechError::MissingActorContext)?;

    let test_skill = options.skill.or(activation.and_then(|a| a.skill));
    let test_attribute = options
        .attribute
        .or(activation.and_then(|a| a.attribute))
        .or(test_skill.map(|s| actor.skill(s).attribute));
    let damage_skill = options
        .damage_skill
        .or(item.damage().and_then(|d| d.skill))
        .or(test_skill);
    let damage_attribute = options
        .damage_attribute
        .or(item.damage().and_then(|d| d.attribute))
        .or(damage_skill.map(|s| actor.skill(s).attribute));

    let mut parts = options.parts.clone().unwrap_or_else(|| {
        activation
            .and_then(|a| a.modifier_formula.clone())
            .into_iter()
            .collect()
    });

    let advantage_mode = options.advantage_mode.unwrap_or_default();
    let prompt = AttackPrompt {
        title: title(item, test_skill),
        default_attribute: test_attribute,
        advantage_mode,
        plot_die: options
            .plot_die
            .or(activation.and_then(|a| a.plot_die))
            .unwrap_or(config.plot_die),
        plot_advantage_mode: options.plot_advantage_mode.unwrap_or_default(),
        skill_formula: test_activation.map(|_| {
            let (_, modifier) = skill_test_data(actor, test_skill, test_attribute);
            formula::build(&formula::die_spec(20, advantage_mode), modifier, &parts)
        }),
        damage_formula: damage_formula.map(str::to_string),
        damage_dice: match damage_formula {
            Some(f) => {
                let (data, _) = damage_data(actor, damage_skill, damage_attribute);
                let text = replace_formula_data(f, &data)?;
                formula::damage_dice(&Roll::parse_with_limits(&text, config.limits())?)
            }
            None => Vec::new(),
        },
    };

    let Some(chosen) = configurator.configure_attack(&prompt) else {
        return Err(MechError::Cancelled);
    };
    tracing::debug!(title = %prompt.title, ?chosen, "attack configured");

    let skill_test = match test_activation {
        Some(activation) => {
            if let Some(temporary) = chosen.temporary_modifiers.clone() {
                parts.push(temporary);
            }
            let attribute = chosen.attribute.or(test_attribute);
            let (data, modifier) = skill_test_data(actor, test_skill, attribute);
            let mut request = RollRequest::new(RollKind::Attack)
                .with_modifier(modifier)
                .with_advantage(chosen.advantage_mode)
                .with_plot_die(chosen.plot_die, chosen.plot_advantage_mode);
            request.extra_parts = parts;
            let request = with_thresholds(request, activation, options, config)?;
            let mut outcome = skill_test::resolve(&request, &data, source, config)?;
            outcome.source = Some(item.name.clone());
            Some(outcome)
        }
        None => None,
    };

    let damage = match damage_formula {
        Some(_) => {
            let damage_options = DamageOptions {
                skill: damage_skill,
                attribute: damage_attribute,
                override_formula: formula::advantage_override(&chosen.damage_dice),
                critical: options.critical,
            };
            Some(roll_item_damage(
                Some(actor),
                item,
                &damage_options,
                source,
                config,
            )?)
        }
        None => None,
    };

    Ok(AttackOutcome { skill_test, damage })
}

/// Apply threshold overrides from the options, then the activation, then
/// the rules configuration.
pub(crate) fn with_thresholds(
    request: RollRequest,
    activation: &Activation,
    options: &AttackOptions,
    config: &RulesConfig,
) -> MechResult<RollRequest> {
    let opportunity = options
        .opportunity
        .or(activation.opportunity)
        .unwrap_or(config.opportunity_threshold);
    let complication = options
        .complication
        .or(activation.complication)
        .unwrap_or(config.complication_threshold);
    request.with_thresholds(opportunity, complication)
}

fn title(item: &Item, skill: Option<Skill>) -> String {
    match skill {
        Some(skill) => format!("{} ({})", item.name, skill.name()),
        None => format!("{} (Custom Skill)", item.name),
    }
}
