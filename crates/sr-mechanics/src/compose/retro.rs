//! Retroactive upgrades and rerolls of resolved rolls.
//!
//! Every transform here takes an outcome and returns a new one; the input
//! is left untouched.

use serde::{Deserialize, Serialize};
use sr_dice::{DieResult, DieSource, EvalMode, Faces};

use super::{AdvantageMode, RollOutcome};
use crate::error::{MechError, MechResult};

/// Direction of a retroactive advantage upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetroUpgrade {
    /// Roll a second d20 and keep the highest.
    Advantage,
    /// Roll a second d20 and keep the lowest.
    Disadvantage,
}

impl From<RetroUpgrade> for AdvantageMode {
    fn from(upgrade: RetroUpgrade) -> Self {
        match upgrade {
            RetroUpgrade::Advantage => AdvantageMode::Advantage,
            RetroUpgrade::Disadvantage => AdvantageMode::Disadvantage,
        }
    }
}

/// Returns true if a skill test rolled a single d20 and can gain a second.
pub fn can_retro_advantage(outcome: &RollOutcome) -> bool {
    outcome.kind.is_test() && outcome.d20().is_some_and(|d| d.number < 2)
}

/// Returns true if there are damage rolls and none is critical yet.
pub fn can_retro_critical(rolls: &[RollOutcome]) -> bool {
    let mut damage = rolls.iter().filter(|r| !r.kind.is_test()).peekable();
    damage.peek().is_some() && damage.all(|r| !r.is_critical)
}

/// Give a resolved skill test advantage or disadvantage after the fact.
///
/// The d20 already rolled is kept, one more d20 is sampled, and the keep
/// modifier picks between them. Thresholds are re-applied to the new kept
/// die, and formula and total are re-derived.
pub fn upgrade_skill_test(
    outcome: &RollOutcome,
    upgrade: RetroUpgrade,
    source: &mut impl DieSource,
) -> MechResult<RollOutcome> {
    if !can_retro_advantage(outcome) {
        return Err(MechError::RetroUnavailable("advantage"));
    }
    let mode = AdvantageMode::from(upgrade);
    let mut upgraded = outcome.clone();
    let Some(d20) = upgraded.roll.find_dice_mut(Faces::Sides(20)) else {
        return Err(MechError::RetroUnavailable("advantage"));
    };
    while d20.results.len() < 2 {
        d20.results.push(DieResult::new(source.face(20)));
    }
    d20.number = 2;
    d20.keep = mode.keep();
    d20.apply_keep();
    if let Some(thresholds) = outcome.thresholds {
        d20.mark_thresholds(thresholds.opportunity, thresholds.complication);
    }

    upgraded.advantage_mode = mode;
    upgraded.refresh()?;
    tracing::debug!(formula = %upgraded.formula, total = upgraded.total, "retroactive {mode:?}");
    Ok(upgraded)
}

/// Turn resolved damage rolls into critical hits after the fact.
///
/// Every die of every damage roll, and of its graze roll, is forced to its
/// maximum face. Skill tests pass through unchanged.
pub fn upgrade_critical(rolls: &[RollOutcome]) -> MechResult<Vec<RollOutcome>> {
    if !can_retro_critical(rolls) {
        return Err(MechError::RetroUnavailable("critical"));
    }
    rolls
        .iter()
        .map(|roll| {
            if roll.kind.is_test() {
                return Ok(roll.clone());
            }
            let mut crit = maximized(roll)?;
            crit.graze = roll
                .graze
                .as_deref()
                .map(|g| maximized(g).map(Box::new))
                .transpose()?;
            Ok(crit)
        })
        .collect()
}

fn maximized(outcome: &RollOutcome) -> MechResult<RollOutcome> {
    let mut crit = outcome.clone();
    crit.roll.maximize()?;
    crit.is_critical = true;
    crit.refresh()?;
    Ok(crit)
}

/// Roll the same formula again with fresh dice.
///
/// Critical rolls stay critical. A graze roll that shared the primary
/// roll's dice shares the new ones; an independent graze is rolled again.
pub fn reroll(outcome: &RollOutcome, source: &mut impl DieSource) -> MechResult<RollOutcome> {
    let mode = if outcome.is_critical {
        EvalMode::Maximize
    } else {
        EvalMode::Normal
    };

    let mut fresh = outcome.clone();
    fresh.roll = outcome.roll.cleared();
    fresh.roll.evaluate(source, mode)?;
    if let (Some(thresholds), Some(d20)) =
        (outcome.thresholds, fresh.roll.find_dice_mut(Faces::Sides(20)))
    {
        d20.mark_thresholds(thresholds.opportunity, thresholds.complication);
    }
    fresh.refresh()?;

    if let Some(graze) = outcome.graze.as_deref() {
        let mut again = graze.clone();
        again.roll = graze.roll.cleared();
        if graze.shares_dice {
            again.roll.replace_die_results(&fresh.roll.dice());
        }
        again.roll.evaluate(source, mode)?;
        again.refresh()?;
        fresh.graze = Some(Box::new(again));
    }
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::damage::{self, DamageRequest};
    use crate::compose::{RollRequest, skill_test};
    use crate::config::RulesConfig;
    use sr_dice::{RollData, Scripted};

    fn test_outcome(request: RollRequest, faces: &[u32]) -> RollOutcome {
        skill_test::resolve(
            &request,
            &RollData::new(),
            &mut Scripted::new(faces.iter().copied()),
            &RulesConfig::default(),
        )
        .unwrap()
    }

    fn damage_outcome(formula: &str, faces: &[u32]) -> RollOutcome {
        damage::resolve(
            &DamageRequest::new(formula),
            &RollData::new(),
            &mut Scripted::new(faces.iter().copied()),
            &RulesConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn advantage_keeps_existing_die() {
        let original = test_outcome(RollRequest::skill_test(3), &[8]);
        let upgraded =
            upgrade_skill_test(&original, RetroUpgrade::Advantage, &mut Scripted::new([15]))
                .unwrap();
        assert_eq!(upgraded.formula, "2d20kh + 3");
        assert_eq!(upgraded.total, 18);
        assert_eq!(upgraded.dice[0].face, 8);
        assert!(upgraded.dice[0].discarded);
        assert_eq!(upgraded.advantage_mode, AdvantageMode::Advantage);
        assert_eq!(original.total, 11);
    }

    #[test]
    fn disadvantage_can_lose_an_opportunity() {
        let original = test_outcome(RollRequest::skill_test(0), &[20]);
        assert!(original.rolled_opportunity());
        let upgraded =
            upgrade_skill_test(&original, RetroUpgrade::Disadvantage, &mut Scripted::new([1]))
                .unwrap();
        assert_eq!(upgraded.total, 1);
        assert!(!upgraded.rolled_opportunity());
        assert!(upgraded.rolled_complication());
    }

    #[test]
    fn no_second_upgrade() {
        let request = RollRequest::skill_test(0).with_advantage(AdvantageMode::Advantage);
        let original = test_outcome(request, &[3, 4]);
        assert!(!can_retro_advantage(&original));
        assert!(matches!(
            upgrade_skill_test(&original, RetroUpgrade::Advantage, &mut Scripted::new([9])),
            Err(MechError::RetroUnavailable(_))
        ));
    }

    #[test]
    fn damage_rolls_cannot_gain_advantage() {
        let damage = damage_outcome("1d20", &[4]);
        assert!(!can_retro_advantage(&damage));
    }

    #[test]
    fn critical_maximises_roll_and_graze() {
        let test = test_outcome(RollRequest::skill_test(0), &[12]);
        let damage = damage_outcome("2d6 + 3", &[1, 2]);
        let rolls = vec![test.clone(), damage];
        assert!(can_retro_critical(&rolls));

        let upgraded = upgrade_critical(&rolls).unwrap();
        assert_eq!(upgraded[0], test);
        let crit = &upgraded[1];
        assert!(crit.is_critical);
        assert_eq!(crit.total, 15);
        assert_eq!(crit.formula, "2d6 + 3");
        let graze = crit.graze.as_deref().unwrap();
        assert_eq!(graze.total, 12);
        assert!(graze.is_critical);
        assert!(!can_retro_critical(&upgraded));
    }

    #[test]
    fn critical_past_the_total_range_fails() {
        let damage = damage_outcome("1d6 + 9223372036854775805", &[1]);
        assert!(matches!(
            upgrade_critical(&[damage]),
            Err(MechError::MalformedFormula(sr_dice::DiceError::Overflow))
        ));
    }

    #[test]
    fn critical_needs_damage() {
        let test = test_outcome(RollRequest::skill_test(0), &[12]);
        assert!(!can_retro_critical(std::slice::from_ref(&test)));
        assert!(upgrade_critical(&[test]).is_err());
    }

    #[test]
    fn reroll_draws_fresh_dice() {
        let original = test_outcome(RollRequest::skill_test(2), &[5]);
        let again = reroll(&original, &mut Scripted::new([20])).unwrap();
        assert_eq!(again.formula, original.formula);
        assert_eq!(again.total, 22);
        assert!(again.rolled_opportunity());
    }

    #[test]
    fn reroll_keeps_graze_linked() {
        let original = damage_outcome("1d8 + 2", &[3]);
        let again = reroll(&original, &mut Scripted::new([7])).unwrap();
        assert_eq!(again.total, 9);
        assert_eq!(again.graze_total(), Some(7));
    }

    #[test]
    fn reroll_of_critical_stays_critical() {
        let crit = upgrade_critical(&[damage_outcome("1d10", &[2])]).unwrap();
        let again = reroll(&crit[0], &mut Scripted::new([1])).unwrap();
        assert_eq!(again.total, 10);
        assert!(again.is_critical);
    }
}
