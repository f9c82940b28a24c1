//! Damage summaries and applying damage to a target.

use serde::{Deserialize, Serialize};

use crate::compose::RollOutcome;
use crate::error::{MechError, MechResult};
use crate::item::DamageType;
use crate::sheet::{ActorSheet, Resource, Track};

/// Totals of the damage rolls of one result card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageSummary {
    /// Sum of the full damage totals.
    pub total: i64,
    /// Sum of the graze totals.
    pub graze_total: i64,
    /// Damage formulas joined with `+`.
    pub formula: String,
    /// Graze formulas joined with `+`.
    pub graze_formula: String,
    /// Any damage roll was a critical hit.
    pub critical: bool,
    /// Distinct damage types, sorted.
    pub damage_types: Vec<DamageType>,
}

impl DamageSummary {
    /// Summarise the damage rolls among `rolls`. Skill tests are ignored.
    pub fn from_rolls<'a>(rolls: impl IntoIterator<Item = &'a RollOutcome>) -> Self {
        let mut summary = Self::default();
        let mut formulas = Vec::new();
        let mut graze_formulas = Vec::new();
        for roll in rolls.into_iter().filter(|r| !r.kind.is_test()) {
            summary.total += roll.total;
            formulas.push(roll.formula.as_str());
            if let Some(graze) = &roll.graze {
                summary.graze_total += graze.total;
                graze_formulas.push(graze.formula.as_str());
            }
            summary.critical |= roll.is_critical;
            summary.damage_types.extend(roll.damage_type);
        }
        summary.formula = formulas.join(" + ");
        summary.graze_formula = graze_formulas.join(" + ");
        summary.damage_types.sort();
        summary.damage_types.dedup();
        summary
    }
}

/// How to apply damage rolls to a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Apply graze totals instead of full totals.
    pub use_graze: bool,
    /// Added to each roll's total before the multiplier.
    pub modifier: i64,
    /// Scales each amount; negative values heal, zero does nothing.
    pub multiplier: f64,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            use_graze: false,
            modifier: 0,
            multiplier: 1.0,
        }
    }
}

/// One amount dealt to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDamage {
    /// Amount before clamping to the health track.
    pub amount: i64,
    /// Damage type; healing when the multiplier was negative.
    pub damage_type: Option<DamageType>,
}

impl AppliedDamage {
    /// Returns true if this amount restores health.
    pub fn is_healing(&self) -> bool {
        self.damage_type == Some(DamageType::Healing)
    }
}

/// The amounts each damage roll deals under `options`.
///
/// Per roll: (total or graze total, plus modifier) times the magnitude of
/// the multiplier, rounded down and never below zero.
pub fn damage_amounts(rolls: &[RollOutcome], options: &ApplyOptions) -> Vec<AppliedDamage> {
    if options.multiplier == 0.0 {
        return Vec::new();
    }
    let scale = options.multiplier.abs();
    rolls
        .iter()
        .filter(|r| !r.kind.is_test())
        .map(|roll| {
            let base = if options.use_graze {
                roll.graze_total().unwrap_or(0)
            } else {
                roll.total
            };
            let amount = (base.saturating_add(options.modifier) as f64 * scale).floor() as i64;
            AppliedDamage {
                amount: amount.max(0),
                damage_type: if options.multiplier < 0.0 {
                    Some(DamageType::Healing)
                } else {
                    roll.damage_type
                },
            }
        })
        .collect()
}

/// Apply damage rolls to a target's health.
///
/// Damage lowers health down to the track minimum; healing raises it up to
/// the maximum. Returns the health track afterwards.
pub fn apply_damage(
    target: &mut ActorSheet,
    rolls: &[RollOutcome],
    options: &ApplyOptions,
) -> MechResult<Track> {
    let name = target.name.clone();
    let health = target
        .resource_mut(Resource::Health)
        .ok_or_else(|| MechError::UnknownResource(Resource::Health.name().into()))?;
    for applied in damage_amounts(rolls, options) {
        let delta = if applied.is_healing() {
            applied.amount
        } else {
            -applied.amount
        };
        health.adjust(delta);
        tracing::info!(
            target = %name,
            amount = applied.amount,
            damage_type = ?applied.damage_type,
            health = %health,
            "applied damage"
        );
    }
    Ok(*health)
}

/// Lower a target's focus by one plus `modifier`. Returns the focus track
/// afterwards.
pub fn reduce_focus(target: &mut ActorSheet, modifier: i64) -> MechResult<Track> {
    let name = target.name.clone();
    let focus = target
        .resource_mut(Resource::Focus)
        .ok_or_else(|| MechError::UnknownResource(Resource::Focus.name().into()))?;
    focus.adjust(1i64.saturating_add(modifier).saturating_neg());
    tracing::info!(target = %name, focus = %focus, "reduced focus");
    Ok(*focus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::damage::{self, DamageRequest};
    use crate::compose::{RollRequest, retro, skill_test};
    use crate::config::RulesConfig;
    use sr_dice::{RollData, Scripted};

    fn damage_roll(formula: &str, kind: DamageType, faces: &[u32]) -> RollOutcome {
        let request = DamageRequest {
            damage_type: Some(kind),
            ..DamageRequest::new(formula)
        };
        damage::resolve(
            &request,
            &RollData::new(),
            &mut Scripted::new(faces.iter().copied()),
            &RulesConfig::default(),
        )
        .unwrap()
    }

    fn target() -> ActorSheet {
        ActorSheet::new("Parshendi Warrior")
            .with_resource(Resource::Health, 20, 20)
            .with_resource(Resource::Focus, 3, 4)
    }

    #[test]
    fn summary_joins_rolls() {
        let test = skill_test::resolve(
            &RollRequest::skill_test(0),
            &RollData::new(),
            &mut Scripted::new([10]),
            &RulesConfig::default(),
        )
        .unwrap();
        let rolls = vec![
            test,
            damage_roll("1d8 + 2", DamageType::Keen, &[5]),
            damage_roll("1d6", DamageType::Energy, &[4]),
        ];
        let summary = DamageSummary::from_rolls(&rolls);
        assert_eq!(summary.total, 11);
        assert_eq!(summary.graze_total, 9);
        assert_eq!(summary.formula, "1d8 + 2 + 1d6");
        assert_eq!(summary.graze_formula, "1d8 + 1d6");
        assert!(!summary.critical);
        assert_eq!(summary.damage_types, vec![DamageType::Energy, DamageType::Keen]);
    }

    #[test]
    fn summary_flags_critical() {
        let rolls = retro::upgrade_critical(&[damage_roll("1d4", DamageType::Impact, &[1])]).unwrap();
        assert!(DamageSummary::from_rolls(&rolls).critical);
    }

    #[test]
    fn damage_lowers_health() {
        let mut target = target();
        let rolls = [damage_roll("1d8 + 3", DamageType::Keen, &[6])];
        let health = apply_damage(&mut target, &rolls, &ApplyOptions::default()).unwrap();
        assert_eq!(health.value, 11);
    }

    #[test]
    fn graze_with_modifier_and_half() {
        let mut target = target();
        let rolls = [damage_roll("1d8 + 3", DamageType::Keen, &[7])];
        let options = ApplyOptions {
            use_graze: true,
            modifier: 2,
            multiplier: 0.5,
        };
        assert_eq!(damage_amounts(&rolls, &options)[0].amount, 4);
        let health = apply_damage(&mut target, &rolls, &options).unwrap();
        assert_eq!(health.value, 16);
    }

    #[test]
    fn negative_multiplier_heals_up_to_max() {
        let mut target = target();
        target.resource_mut(Resource::Health).unwrap().set(5);
        let rolls = [damage_roll("2d6", DamageType::Vital, &[6, 6])];
        let options = ApplyOptions {
            multiplier: -1.0,
            ..ApplyOptions::default()
        };
        let amounts = damage_amounts(&rolls, &options);
        assert!(amounts[0].is_healing());
        assert_eq!(apply_damage(&mut target, &rolls, &options).unwrap().value, 17);
        assert_eq!(apply_damage(&mut target, &rolls, &options).unwrap().value, 20);
    }

    #[test]
    fn zero_multiplier_does_nothing() {
        let mut target = target();
        let rolls = [damage_roll("1d8", DamageType::Keen, &[8])];
        let options = ApplyOptions {
            multiplier: 0.0,
            ..ApplyOptions::default()
        };
        assert_eq!(apply_damage(&mut target, &rolls, &options).unwrap().value, 20);
    }

    #[test]
    fn health_floors_at_minimum() {
        let mut target = target();
        let rolls = [damage_roll("1d20 + 20", DamageType::Spirit, &[20])];
        assert_eq!(
            apply_damage(&mut target, &rolls, &ApplyOptions::default())
                .unwrap()
                .value,
            0
        );
    }

    #[test]
    fn focus_drops_by_one_plus_modifier() {
        let mut target = target();
        assert_eq!(reduce_focus(&mut target, 0).unwrap().value, 2);
        assert_eq!(reduce_focus(&mut target, 5).unwrap().value, 0);
    }

    #[test]
    fn extreme_modifiers_saturate() {
        let mut target = target();
        let rolls = [damage_roll("1d8", DamageType::Keen, &[8])];
        let options = ApplyOptions {
            modifier: i64::MAX,
            ..ApplyOptions::default()
        };
        assert_eq!(damage_amounts(&rolls, &options)[0].amount, i64::MAX);
        assert_eq!(apply_damage(&mut target, &rolls, &options).unwrap().value, 0);

        let mut tired = self::target();
        assert_eq!(reduce_focus(&mut tired, i64::MAX).unwrap().value, 0);
        assert_eq!(reduce_focus(&mut tired, i64::MIN).unwrap().value, 4);
    }

    #[test]
    fn target_without_health() {
        let mut target = ActorSheet::new("Spren");
        let err = apply_damage(&mut target, &[], &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, MechError::UnknownResource(_)));
    }
}
