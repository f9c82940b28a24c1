//! The roll composer.
//!
//! Builds formulas from an actor's statistics and an item's configuration,
//! evaluates them against an injected [`DieSource`](sr_dice::DieSource), and
//! returns serialisable [`RollOutcome`]s. Nothing here holds state between
//! calls: every resolver is a function of its inputs and the die source.

pub mod attack;
pub mod configure;
pub mod damage;
pub mod data;
pub mod formula;
pub mod retro;

pub use attack::{AttackOptions, AttackOutcome, roll_attack};
pub use configure::{AttackConfig, AttackPrompt, DamageDie, DamageDieMode, FastForward, RollConfigurator};
pub use damage::{DamageOptions, DamageRequest, roll_damage};
pub use retro::{
    RetroUpgrade, can_retro_advantage, can_retro_critical, reroll, upgrade_critical,
    upgrade_skill_test,
};
pub use skill_test::roll_skill;

use serde::{Deserialize, Serialize};
use sr_dice::{DiceTerm, DieResult, Faces, Keep, Roll};

use crate::error::{MechError, MechResult};
use crate::item::DamageType;

/// Roll twice and keep one, or roll once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvantageMode {
    /// Roll once.
    #[default]
    None,
    /// Roll twice, keep the highest.
    Advantage,
    /// Roll twice, keep the lowest.
    Disadvantage,
}

impl AdvantageMode {
    /// Number of dice rolled.
    pub fn dice(self) -> u32 {
        match self {
            AdvantageMode::None => 1,
            AdvantageMode::Advantage | AdvantageMode::Disadvantage => 2,
        }
    }

    /// Keep modifier applied to the rolled dice.
    pub fn keep(self) -> Option<Keep> {
        match self {
            AdvantageMode::None => None,
            AdvantageMode::Advantage => Some(Keep::Highest(1)),
            AdvantageMode::Disadvantage => Some(Keep::Lowest(1)),
        }
    }
}

/// What a roll is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollKind {
    /// A plain skill test.
    SkillTest,
    /// A damage roll.
    Damage,
    /// The skill test of an attack.
    Attack,
}

impl RollKind {
    /// Returns true for skill tests, including the test leg of an attack.
    pub fn is_test(self) -> bool {
        matches!(self, RollKind::SkillTest | RollKind::Attack)
    }
}

/// Opportunity and complication thresholds for a natural d20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Natural result at or above which the test rolls an opportunity.
    pub opportunity: u32,
    /// Natural result at or below which the test rolls a complication.
    pub complication: u32,
}

impl Thresholds {
    /// Thresholds, rejected unless `opportunity > complication`.
    pub fn new(opportunity: u32, complication: u32) -> MechResult<Self> {
        if opportunity <= complication {
            return Err(MechError::InvalidThresholds {
                opportunity,
                complication,
            });
        }
        Ok(Self {
            opportunity,
            complication,
        })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            opportunity: 20,
            complication: 1,
        }
    }
}

/// A request for a skill test.
///
/// Built once per action and read by the resolver; thresholds are validated
/// on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    /// What the roll is for.
    pub kind: RollKind,
    /// Flat modifier, usually skill rank plus attribute.
    pub base_modifier: i64,
    /// Formula fragments appended after the modifier, in order.
    pub extra_parts: Vec<String>,
    /// Advantage on the d20.
    pub advantage_mode: AdvantageMode,
    /// Roll the plot die with the test.
    pub include_plot_die: bool,
    /// Advantage on the plot die.
    pub plot_advantage_mode: AdvantageMode,
    thresholds: Thresholds,
}

impl RollRequest {
    /// A request with default thresholds and no modifiers.
    pub fn new(kind: RollKind) -> Self {
        Self {
            kind,
            base_modifier: 0,
            extra_parts: Vec::new(),
            advantage_mode: AdvantageMode::None,
            include_plot_die: false,
            plot_advantage_mode: AdvantageMode::None,
            thresholds: Thresholds::default(),
        }
    }

    /// A skill test with modifier `base_modifier`.
    pub fn skill_test(base_modifier: i64) -> Self {
        Self::new(RollKind::SkillTest).with_modifier(base_modifier)
    }

    /// Builder: set the flat modifier.
    pub fn with_modifier(mut self, base_modifier: i64) -> Self {
        self.base_modifier = base_modifier;
        self
    }

    /// Builder: append a formula fragment.
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.extra_parts.push(part.into());
        self
    }

    /// Builder: set the d20 advantage mode.
    pub fn with_advantage(mut self, mode: AdvantageMode) -> Self {
        self.advantage_mode = mode;
        self
    }

    /// Builder: roll the plot die with its own advantage mode.
    pub fn with_plot_die(mut self, include: bool, mode: AdvantageMode) -> Self {
        self.include_plot_die = include;
        self.plot_advantage_mode = mode;
        self
    }

    /// Builder: set thresholds, rejecting overlapping ones.
    pub fn with_thresholds(mut self, opportunity: u32, complication: u32) -> MechResult<Self> {
        self.thresholds = Thresholds::new(opportunity, complication)?;
        Ok(self)
    }

    /// The validated thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

/// A resolved roll.
///
/// `formula`, `total`, and `dice` are always derived from `roll`, so
/// transforms edit the roll and call [`RollOutcome::refresh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// What the roll was for.
    pub kind: RollKind,
    /// The evaluated formula.
    pub formula: String,
    /// The total.
    pub total: i64,
    /// Every die result, discarded ones included.
    pub dice: Vec<DieResult>,
    /// Dice were forced to their maximum.
    #[serde(default)]
    pub is_critical: bool,
    /// The graze roll accompanying a damage roll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graze: Option<Box<RollOutcome>>,
    /// The evaluated terms.
    pub roll: Roll,
    /// Advantage on the primary die.
    #[serde(default)]
    pub advantage_mode: AdvantageMode,
    /// Thresholds a skill test was marked with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    /// Damage modifier, when one applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i64>,
    /// Damage type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<DamageType>,
    /// This graze roll copies its dice from the primary roll.
    #[serde(default)]
    pub shares_dice: bool,
    /// Name of the item rolled, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RollOutcome {
    /// An outcome derived from an evaluated roll.
    pub fn from_roll(kind: RollKind, roll: Roll) -> MechResult<Self> {
        let total = roll.try_total()?;
        Ok(Self {
            kind,
            formula: roll.formula(),
            total,
            dice: roll.results(),
            is_critical: false,
            graze: None,
            roll,
            advantage_mode: AdvantageMode::None,
            thresholds: None,
            modifier: None,
            damage_type: None,
            shares_dice: false,
            source: None,
        })
    }

    /// Re-derive formula, total, and dice from the roll.
    pub fn refresh(&mut self) -> MechResult<()> {
        self.total = self.roll.reset_total()?;
        self.formula = self.roll.formula();
        self.dice = self.roll.results();
        Ok(())
    }

    /// The primary d20 term of a skill test.
    pub fn d20(&self) -> Option<&DiceTerm> {
        self.roll.find_dice(Faces::Sides(20))
    }

    /// The plot die term, if the stakes were raised.
    pub fn plot(&self) -> Option<&DiceTerm> {
        self.roll.find_dice(Faces::Plot)
    }

    /// The d20 or the plot die rolled an opportunity.
    pub fn rolled_opportunity(&self) -> bool {
        self.d20().is_some_and(DiceTerm::rolled_opportunity)
            || self.plot().is_some_and(DiceTerm::rolled_opportunity)
    }

    /// The d20 or the plot die rolled a complication.
    pub fn rolled_complication(&self) -> bool {
        self.d20().is_some_and(DiceTerm::rolled_complication)
            || self.plot().is_some_and(DiceTerm::rolled_complication)
    }

    /// Total of the graze roll, if there is one.
    pub fn graze_total(&self) -> Option<i64> {
        self.graze.as_ref().map(|g| g.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_dice::{EvalMode, Scripted};

    #[test]
    fn thresholds_must_not_overlap() {
        assert!(Thresholds::new(20, 1).is_ok());
        assert!(matches!(
            Thresholds::new(10, 10),
            Err(MechError::InvalidThresholds {
                opportunity: 10,
                complication: 10
            })
        ));
        assert!(RollRequest::skill_test(0).with_thresholds(1, 5).is_err());
    }

    #[test]
    fn request_defaults() {
        let request = RollRequest::skill_test(3);
        assert_eq!(request.kind, RollKind::SkillTest);
        assert_eq!(request.base_modifier, 3);
        assert_eq!(request.thresholds(), Thresholds::default());
        assert!(!request.include_plot_die);
    }

    #[test]
    fn advantage_dice_and_keep() {
        assert_eq!(AdvantageMode::None.dice(), 1);
        assert_eq!(AdvantageMode::Advantage.keep(), Some(Keep::Highest(1)));
        assert_eq!(AdvantageMode::Disadvantage.keep(), Some(Keep::Lowest(1)));
    }

    #[test]
    fn outcome_requires_evaluated_roll() {
        let roll = Roll::parse("1d20").unwrap();
        assert!(matches!(
            RollOutcome::from_roll(RollKind::SkillTest, roll),
            Err(MechError::MalformedFormula(_))
        ));
    }

    #[test]
    fn outcome_serialises_round_trip() {
        let mut roll = Roll::parse("1d20 + 2 + 1dp").unwrap();
        roll.evaluate(&mut Scripted::new([12, 5]), EvalMode::Normal)
            .unwrap();
        let outcome = RollOutcome::from_roll(RollKind::SkillTest, roll).unwrap();
        assert_eq!(outcome.total, 14);
        assert!(outcome.rolled_opportunity());
        let json = serde_json::to_string(&outcome).unwrap();
        let back: RollOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
