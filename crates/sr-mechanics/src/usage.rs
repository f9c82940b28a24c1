//! Using an item: costs, limited uses, modes, and the rolls they gate.
//!
//! [`use_item`] checks everything up front and rolls, but changes nothing.
//! The changes it would make come back as a list of [`UsageCommit`]s that
//! the host applies once it has shown the result.

use serde::{Deserialize, Serialize};
use sr_dice::DieSource;

use crate::compose::attack::with_thresholds;
use crate::compose::{
    AttackOptions, DamageOptions, RollConfigurator, RollKind, RollOutcome, RollRequest,
    roll_attack, roll_damage, roll_skill,
};
use crate::config::RulesConfig;
use crate::error::{MechError, MechResult};
use crate::item::{Activation, ConsumeType, Item};
use crate::sheet::{ActorSheet, Resource};

/// Options for using an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UseOptions {
    /// `Some(true)` pays the cost without asking, `Some(false)` skips it.
    /// Unset asks the configurator.
    pub should_consume: Option<bool>,
    /// Overrides passed on to the rolls.
    pub attack: AttackOptions,
}

/// A change to apply after an item use has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UsageCommit {
    /// Set an actor resource to a new value.
    SetResource {
        /// The resource paid.
        resource: Resource,
        /// Its value after paying.
        value: i64,
    },
    /// Set the item's remaining uses.
    SetUses {
        /// Uses left.
        value: i64,
    },
    /// Activate a mode on the actor.
    ActivateMode {
        /// The modality, e.g. a stance slot.
        modality: String,
        /// The item providing the mode.
        item_id: String,
    },
    /// A recognised cost that has no effect yet.
    Unsupported {
        /// What was skipped.
        action: String,
    },
}

impl UsageCommit {
    /// Apply the change.
    pub fn apply(&self, actor: &mut ActorSheet, item: &mut Item) {
        match self {
            UsageCommit::SetResource { resource, value } => {
                if let Some(track) = actor.resource_mut(*resource) {
                    track.set(*value);
                }
            }
            UsageCommit::SetUses { value } => {
                if let Some(uses) = item.activation_mut().and_then(|a| a.uses.as_mut()) {
                    uses.value = *value;
                }
            }
            UsageCommit::ActivateMode { modality, item_id } => {
                actor.set_mode(modality.as_str(), item_id.as_str());
            }
            UsageCommit::Unsupported { action } => {
                tracing::warn!(%action, item = %item.name, "not implemented");
            }
        }
    }
}

/// The result of using an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUsage {
    /// Name of the item used.
    pub item: String,
    /// Flavor line: the activation's flavor or "Skill (Attribute)".
    pub flavor: Option<String>,
    /// Rolls made, in display order. Empty for utility uses.
    pub rolls: Vec<RollOutcome>,
    /// Changes still to apply.
    pub commits: Vec<UsageCommit>,
}

impl ItemUsage {
    /// Apply every pending change to the actor and the item.
    pub fn commit(&self, actor: &mut ActorSheet, item: &mut Item) {
        for commit in &self.commits {
            tracing::info!(item = %self.item, actor = %actor.name, ?commit, "commit");
            commit.apply(actor, item);
        }
    }

    /// Returns true if the use rolled nothing.
    pub fn is_utility(&self) -> bool {
        self.rolls.is_empty()
    }
}

/// Use an item.
///
/// Checks run in order: the item must have an activation, an actor must be
/// present, the cost is confirmed and must be affordable, and limited uses
/// must remain. Failing any of them aborts before a die is sampled. The
/// returned usage holds the rolls and the pending changes; nothing is
/// mutated until [`ItemUsage::commit`].
pub fn use_item(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &UseOptions,
    configurator: &mut dyn RollConfigurator,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<ItemUsage> {
    use_checked(actor, item, options, configurator, source, config)
        .inspect_err(|err| tracing::warn!(%err, item = %item.name, "use aborted"))
}

fn use_checked(
    actor: Option<&ActorSheet>,
    item: &Item,
    options: &UseOptions,
    configurator: &mut dyn RollConfigurator,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<ItemUsage> {
    let activation = item
        .activation()
        .ok_or_else(|| MechError::NotActivatable(item.name.clone()))?;
    let actor = actor.ok_or(MechError::MissingActorContext)?;
    let mut commits = Vec::new();

    let consume = activation
        .consume
        .as_ref()
        .filter(|_| options.should_consume != Some(false));
    if let Some(consume) = consume {
        let pay = match options.should_consume {
            Some(true) => true,
            _ => configurator
                .confirm_consume(item, consume)
                .ok_or(MechError::Cancelled)?,
        };
        if pay {
            commits.push(consumption(actor, item, consume.kind, consume.resource, consume.value)?);
        }
    }

    if let Some(uses) = activation.uses {
        if uses.value < 1 {
            return Err(MechError::NotEnoughUses(item.name.clone()));
        }
        commits.push(UsageCommit::SetUses {
            value: uses.value - 1,
        });
    }

    if let Some(modality) = item.modality() {
        commits.push(UsageCommit::ActivateMode {
            modality: modality.to_string(),
            item_id: item.id.clone(),
        });
    }

    let has_damage = item.damage_formula().is_some();
    let mut rolls = Vec::new();
    if item.attack().is_some() && has_damage {
        let outcome = roll_attack(Some(actor), item, &options.attack, configurator, source, config)?;
        rolls = outcome.into_rolls();
    } else {
        if has_damage {
            let damage_options = DamageOptions {
                critical: options.attack.critical,
                ..DamageOptions::default()
            };
            rolls.push(roll_damage(Some(actor), item, &damage_options, source, config)?);
        }
        if activation.is_skill_test() {
            rolls.push(item_test(actor, item, activation, &options.attack, source, config)?);
        }
    }

    let flavor = activation.flavor.clone().or_else(|| {
        let skill = options.attack.skill.or(activation.skill)?;
        let attribute = options
            .attack
            .attribute
            .or(activation.attribute)
            .unwrap_or(actor.skill(skill).attribute);
        rolls
            .iter()
            .any(|r| r.kind.is_test())
            .then(|| format!("{} ({})", skill.name(), attribute.name()))
    });

    tracing::debug!(item = %item.name, rolls = rolls.len(), commits = commits.len(), "item used");
    Ok(ItemUsage {
        item: item.name.clone(),
        flavor,
        rolls,
        commits,
    })
}

fn consumption(
    actor: &ActorSheet,
    item: &Item,
    kind: ConsumeType,
    resource: Option<Resource>,
    amount: i64,
) -> MechResult<UsageCommit> {
    match kind {
        ConsumeType::Resource => {
            let resource = resource.ok_or_else(|| MechError::InvalidItem {
                item: item.name.clone(),
                reason: "resource cost names no resource".into(),
            })?;
            let current = actor
                .resource(resource)
                .ok_or_else(|| MechError::UnknownResource(resource.name().into()))?
                .value;
            if current - amount < 0 {
                return Err(MechError::InsufficientResource {
                    resource: resource.name().into(),
                    required: amount,
                    available: current,
                });
            }
            Ok(UsageCommit::SetResource {
                resource,
                value: current - amount,
            })
        }
        // Item stock is not tracked, so any positive cost is unaffordable.
        ConsumeType::Item => {
            if amount > 0 {
                return Err(MechError::InsufficientResource {
                    resource: "item".into(),
                    required: amount,
                    available: 0,
                });
            }
            Ok(UsageCommit::Unsupported {
                action: "item consumption".into(),
            })
        }
    }
}

fn item_test(
    actor: &ActorSheet,
    item: &Item,
    activation: &Activation,
    options: &AttackOptions,
    source: &mut impl DieSource,
    config: &RulesConfig,
) -> MechResult<RollOutcome> {
    let mut request = RollRequest::new(RollKind::SkillTest)
        .with_advantage(options.advantage_mode.unwrap_or_default())
        .with_plot_die(
            options
                .plot_die
                .or(activation.plot_die)
                .unwrap_or(config.plot_die),
            options.plot_advantage_mode.unwrap_or_default(),
        );
    request.extra_parts = options.parts.clone().unwrap_or_else(|| {
        activation.modifier_formula.iter().cloned().collect()
    });
    let request = with_thresholds(request, activation, options, config)?;

    let skill = options.skill.or(activation.skill);
    let attribute = options.attribute.or(activation.attribute);
    let mut outcome = roll_skill(actor, skill, attribute, request, source, config)?;
    outcome.source = Some(item.name.clone());
    Ok(outcome)
}
