use std::path::Path;

use sr_mechanics::compose::retro::{
    RetroUpgrade, can_retro_advantage, reroll, upgrade_critical, upgrade_skill_test,
};
use sr_mechanics::{MechError, RollOutcome};

use super::output::print_rolls;
use super::{Context, failure, load_rolls};
use crate::RetroAction;

pub fn run(ctx: &mut Context, action: RetroAction, rolls: &Path) -> Result<(), String> {
    let rolls = load_rolls(rolls)?;
    let updated = match action {
        RetroAction::Advantage => upgrade_test(&rolls, RetroUpgrade::Advantage, ctx)?,
        RetroAction::Disadvantage => upgrade_test(&rolls, RetroUpgrade::Disadvantage, ctx)?,
        RetroAction::Critical => upgrade_critical(&rolls).map_err(failure)?,
        RetroAction::Repeat => rolls
            .iter()
            .map(|r| reroll(r, &mut ctx.source))
            .collect::<Result<Vec<_>, _>>()
            .map_err(failure)?,
    };
    ctx.emit(&updated, |rolls| print_rolls(rolls))
}

/// Upgrade the first skill test that can take it; other rolls pass through.
fn upgrade_test(
    rolls: &[RollOutcome],
    upgrade: RetroUpgrade,
    ctx: &mut Context,
) -> Result<Vec<RollOutcome>, String> {
    let index = rolls
        .iter()
        .position(can_retro_advantage)
        .ok_or_else(|| failure(MechError::RetroUnavailable("advantage")))?;
    let mut updated = rolls.to_vec();
    updated[index] = upgrade_skill_test(&rolls[index], upgrade, &mut ctx.source).map_err(failure)?;
    Ok(updated)
}
