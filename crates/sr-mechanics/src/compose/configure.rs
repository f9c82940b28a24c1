//! The configuration seam between the composer and its host.
//!
//! Before any die is sampled, an attack asks a [`RollConfigurator`] to
//! confirm or change its settings, and an item use asks whether to pay the
//! activation cost. Returning `None` means the prompt was dismissed and the
//! action ends with nothing rolled.

use serde::{Deserialize, Serialize};

use super::AdvantageMode;
use crate::item::{Consume, Item};
use crate::sheet::Attribute;

/// One die of a damage formula, as offered for per-die advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDie {
    /// Index of the formula operand the die belongs to.
    pub pool_index: usize,
    /// Number of faces.
    pub faces: u32,
}

/// A damage die with the advantage mode chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDieMode {
    /// The die.
    pub die: DamageDie,
    /// Advantage for this die.
    pub mode: AdvantageMode,
}

/// What an attack offers for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackPrompt {
    /// Prompt title, e.g. `"Spear (Heavy Weaponry)"`.
    pub title: String,
    /// Attribute the test rolls with unless changed.
    pub default_attribute: Option<Attribute>,
    /// Advantage on the d20.
    pub advantage_mode: AdvantageMode,
    /// Roll the plot die.
    pub plot_die: bool,
    /// Advantage on the plot die.
    pub plot_advantage_mode: AdvantageMode,
    /// Preview of the skill test formula.
    pub skill_formula: Option<String>,
    /// Preview of the damage formula.
    pub damage_formula: Option<String>,
    /// The individual damage dice.
    pub damage_dice: Vec<DamageDie>,
}

/// The settings an attack rolls with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackConfig {
    /// Attribute the test rolls with. `None` keeps the prompt's default.
    pub attribute: Option<Attribute>,
    /// Advantage on the d20.
    pub advantage_mode: AdvantageMode,
    /// Roll the plot die.
    pub plot_die: bool,
    /// Advantage on the plot die.
    pub plot_advantage_mode: AdvantageMode,
    /// Extra formula fragment for this roll only, e.g. `"+2"`.
    pub temporary_modifiers: Option<String>,
    /// Advantage per damage die.
    pub damage_dice: Vec<DamageDieMode>,
}

impl AttackConfig {
    /// Accept every default the prompt offers.
    pub fn from_prompt(prompt: &AttackPrompt) -> Self {
        Self {
            attribute: prompt.default_attribute,
            advantage_mode: prompt.advantage_mode,
            plot_die: prompt.plot_die,
            plot_advantage_mode: prompt.plot_advantage_mode,
            temporary_modifiers: None,
            damage_dice: prompt
                .damage_dice
                .iter()
                .map(|&die| DamageDieMode {
                    die,
                    mode: AdvantageMode::None,
                })
                .collect(),
        }
    }
}

/// Host prompts the composer consults before rolling.
pub trait RollConfigurator {
    /// Confirm or change an attack's settings. `None` cancels the attack.
    fn configure_attack(&mut self, prompt: &AttackPrompt) -> Option<AttackConfig>;

    /// Ask whether to pay an activation cost. `None` cancels the use.
    fn confirm_consume(&mut self, item: &Item, consume: &Consume) -> Option<bool>;
}

/// Accepts every default without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastForward;

impl RollConfigurator for FastForward {
    fn configure_attack(&mut self, prompt: &AttackPrompt) -> Option<AttackConfig> {
        Some(AttackConfig::from_prompt(prompt))
    }

    fn confirm_consume(&mut self, _item: &Item, _consume: &Consume) -> Option<bool> {
        Some(true)
    }
}
