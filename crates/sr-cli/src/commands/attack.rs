use std::path::Path;

use sr_mechanics::{FastForward, roll_attack};

use super::output::print_rolls;
use super::{Context, attack_options, failure, load_actor, load_item};
use crate::TestArgs;

pub fn run(
    ctx: &mut Context,
    actor: &Path,
    item: &Path,
    test: &TestArgs,
    critical: bool,
) -> Result<(), String> {
    let actor = load_actor(actor)?;
    let item = load_item(item)?;
    let options = attack_options(test, critical);

    let outcome = roll_attack(
        Some(&actor),
        &item,
        &options,
        &mut FastForward,
        &mut ctx.source,
        &ctx.config,
    )
    .map_err(failure)?;

    ctx.emit(&outcome, |outcome| {
        println!("  {}", item.name);
        print_rolls(&outcome.clone().into_rolls());
    })
}
