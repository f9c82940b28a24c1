use std::path::Path;

use colored::Colorize;
use sr_mechanics::{FastForward, UseOptions, use_item};

use super::output::{print_commits, print_rolls};
use super::{Context, attack_options, failure, load_actor, load_item, write_json};
use crate::TestArgs;

pub fn run(
    ctx: &mut Context,
    actor_path: &Path,
    item_path: &Path,
    test: &TestArgs,
    should_consume: Option<bool>,
    critical: bool,
    save: bool,
) -> Result<(), String> {
    let mut actor = load_actor(actor_path)?;
    let mut item = load_item(item_path)?;
    let options = UseOptions {
        should_consume,
        attack: attack_options(test, critical),
    };

    let usage = use_item(
        Some(&actor),
        &item,
        &options,
        &mut FastForward,
        &mut ctx.source,
        &ctx.config,
    )
    .map_err(failure)?;

    ctx.emit(&usage, |usage| {
        match &usage.flavor {
            Some(flavor) => println!("  {} {}", usage.item.bold(), flavor.dimmed()),
            None => println!("  {}", usage.item.bold()),
        }
        if !usage.is_utility() {
            print_rolls(&usage.rolls);
        }
        print_commits(&usage.commits);
    })?;

    if save {
        usage.commit(&mut actor, &mut item);
        write_json(actor_path, &actor)?;
        write_json(item_path, &item)?;
    }
    Ok(())
}
