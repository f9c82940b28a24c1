use std::path::Path;

use sr_mechanics::{DamageOptions, roll_damage};

use super::output::print_outcome;
use super::{Context, failure, load_actor, load_item};

pub fn run(
    ctx: &mut Context,
    actor: &Path,
    item: &Path,
    options: DamageOptions,
) -> Result<(), String> {
    let actor = load_actor(actor)?;
    let item = load_item(item)?;
    let outcome = roll_damage(Some(&actor), &item, &options, &mut ctx.source, &ctx.config)
        .map_err(failure)?;
    ctx.emit(&outcome, print_outcome)
}
