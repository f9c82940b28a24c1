use std::path::Path;

use sr_mechanics::{AdvantageMode, Attribute, RollKind, RollRequest, Skill, roll_skill};

use super::output::print_outcome;
use super::{Context, failure, load_actor};
use crate::TestArgs;

pub fn run(
    ctx: &mut Context,
    actor: &Path,
    skill: Option<Skill>,
    attribute: Option<Attribute>,
    test: &TestArgs,
) -> Result<(), String> {
    let actor = load_actor(actor)?;
    let thresholds = ctx.config.thresholds().map_err(failure)?;

    let mut request = RollRequest::new(RollKind::SkillTest)
        .with_advantage(test.advantage_mode())
        .with_plot_die(test.plot || ctx.config.plot_die, AdvantageMode::None);
    request.extra_parts = test.parts.clone();
    let request = request
        .with_thresholds(
            test.opportunity.unwrap_or(thresholds.opportunity),
            test.complication.unwrap_or(thresholds.complication),
        )
        .map_err(failure)?;

    let outcome = roll_skill(&actor, skill, attribute, request, &mut ctx.source, &ctx.config)
        .map_err(failure)?;
    ctx.emit(&outcome, print_outcome)
}
