//! Items and their roll capabilities.
//!
//! Each item category is a variant of [`ItemKind`]. Capabilities such as an
//! activation or a damage formula are optional fields of the variants that
//! can carry them, reached through the accessors on [`Item`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use crate::sheet::{Attribute, Resource, Skill};

/// How an item is activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    /// No roll; the activation just happens.
    #[default]
    Utility,
    /// The activation is a skill test.
    SkillTest,
}

/// What an activation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeType {
    /// An actor resource such as focus.
    Resource,
    /// Another item.
    Item,
}

/// The cost of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consume {
    /// What is consumed.
    #[serde(rename = "type")]
    pub kind: ConsumeType,
    /// The resource consumed, for resource costs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    /// Amount consumed.
    pub value: i64,
}

/// Limited uses of an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uses {
    /// Uses left.
    pub value: i64,
    /// Uses after a recharge.
    pub max: i64,
}

/// How an item is activated and what that costs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activation {
    /// Activation type.
    #[serde(rename = "type")]
    pub kind: ActivationType,
    /// Skill tested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    /// Attribute override for the test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
    /// Formula fragment added to the test, e.g. `"+2"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_formula: Option<String>,
    /// Raise the stakes: roll the plot die with the test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_die: Option<bool>,
    /// Opportunity threshold override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<u32>,
    /// Complication threshold override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complication: Option<u32>,
    /// Cost of activating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consume: Option<Consume>,
    /// Limited uses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<Uses>,
    /// Flavor text shown with the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
}

impl Activation {
    /// Returns true if activating rolls a skill test.
    pub fn is_skill_test(&self) -> bool {
        self.kind == ActivationType::SkillTest
    }
}

/// Damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Energy damage.
    Energy,
    /// Impact damage.
    Impact,
    /// Keen damage.
    Keen,
    /// Spirit damage.
    Spirit,
    /// Vital damage.
    Vital,
    /// Healing, applied with a negative multiplier.
    Healing,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DamageType::Energy => "energy",
            DamageType::Impact => "impact",
            DamageType::Keen => "keen",
            DamageType::Spirit => "spirit",
            DamageType::Vital => "vital",
            DamageType::Healing => "healing",
        };
        f.write_str(name)
    }
}

/// An item's damage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Damage {
    /// Damage formula, e.g. `"1d8"`. No formula means no damage roll.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Damage type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DamageType>,
    /// Skill whose rank adds to damage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    /// Attribute that adds to damage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
    /// Graze formula replacing the rules default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graze_override_formula: Option<String>,
}

impl Damage {
    /// The damage formula, if one is set and not blank.
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

/// Attack range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Melee attack.
    #[default]
    Melee,
    /// Ranged attack.
    Ranged,
}

/// An item's attack configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    /// Melee or ranged.
    #[serde(rename = "type")]
    pub kind: AttackType,
    /// Range in feet for ranged attacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<u32>,
}

/// Item categories and the capabilities each can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// A weapon: attacks and deals damage.
    Weapon {
        /// Activation, normally a skill test.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<Activation>,
        /// Attack configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attack: Option<Attack>,
        /// Damage configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<Damage>,
    },
    /// An action: may test a skill and deal damage.
    Action {
        /// Activation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<Activation>,
        /// Damage configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<Damage>,
    },
    /// A power: like an action, fuelled by investiture.
    Power {
        /// Activation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<Activation>,
        /// Damage configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<Damage>,
    },
    /// A talent: may activate and switch the actor into a mode.
    Talent {
        /// Activation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<Activation>,
        /// Modality the talent switches on when used.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modality: Option<String>,
    },
    /// Equipment: may be activated.
    Equipment {
        /// Activation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<Activation>,
        /// Damage configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<Damage>,
    },
    /// A trait with no roll capabilities.
    Trait,
}

/// An item an actor can roll with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, used to record which item set a mode.
    #[serde(default)]
    pub id: String,
    /// Item name.
    pub name: String,
    /// Category and capabilities.
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// An item of the given kind.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase().replace(' ', "-"),
            name,
            kind,
        }
    }

    /// Parse an item from JSON.
    pub fn from_json(json: &str) -> MechResult<Self> {
        serde_json::from_str(json).map_err(|e| MechError::Config(format!("item: {e}")))
    }

    /// The item's activation, if it has one.
    pub fn activation(&self) -> Option<&Activation> {
        match &self.kind {
            ItemKind::Weapon { activation, .. }
            | ItemKind::Action { activation, .. }
            | ItemKind::Power { activation, .. }
            | ItemKind::Talent { activation, .. }
            | ItemKind::Equipment { activation, .. } => activation.as_ref(),
            ItemKind::Trait => None,
        }
    }

    /// Mutable form of [`Item::activation`].
    pub fn activation_mut(&mut self) -> Option<&mut Activation> {
        match &mut self.kind {
            ItemKind::Weapon { activation, .. }
            | ItemKind::Action { activation, .. }
            | ItemKind::Power { activation, .. }
            | ItemKind::Talent { activation, .. }
            | ItemKind::Equipment { activation, .. } => activation.as_mut(),
            ItemKind::Trait => None,
        }
    }

    /// The item's damage configuration, if it has one.
    pub fn damage(&self) -> Option<&Damage> {
        match &self.kind {
            ItemKind::Weapon { damage, .. }
            | ItemKind::Action { damage, .. }
            | ItemKind::Power { damage, .. }
            | ItemKind::Equipment { damage, .. } => damage.as_ref(),
            ItemKind::Talent { .. } | ItemKind::Trait => None,
        }
    }

    /// The damage formula, if the item deals damage.
    pub fn damage_formula(&self) -> Option<&str> {
        self.damage().and_then(Damage::formula)
    }

    /// The item's attack configuration, if it has one.
    pub fn attack(&self) -> Option<&Attack> {
        match &self.kind {
            ItemKind::Weapon { attack, .. } => attack.as_ref(),
            _ => None,
        }
    }

    /// The modality the item activates, if any.
    pub fn modality(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Talent { modality, .. } => modality.as_deref(),
            _ => None,
        }
    }

    /// Restore limited uses to their maximum.
    pub fn recharge(&mut self) {
        if let Some(uses) = self.activation_mut().and_then(|a| a.uses.as_mut()) {
            uses.value = uses.max;
        }
    }
}
