use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use sr_mechanics::apply::damage_amounts;
use sr_mechanics::{ApplyOptions, apply_damage, reduce_focus};

use super::{Context, failure, load_actor, load_rolls, write_json};

pub fn run(
    ctx: &Context,
    target_path: &Path,
    rolls_path: Option<&Path>,
    options: &ApplyOptions,
    focus: bool,
    save: bool,
) -> Result<(), String> {
    let mut target = load_actor(target_path)?;

    if focus {
        let track = reduce_focus(&mut target, options.modifier).map_err(failure)?;
        ctx.emit(&track, |track| println!("  {} focus {track}", target.name))?;
    } else {
        let rolls = load_rolls(rolls_path.ok_or("no rolls to apply")?)?;
        let amounts = damage_amounts(&rolls, options);
        let health = apply_damage(&mut target, &rolls, options).map_err(failure)?;
        ctx.emit(&health, |health| {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Amount", "Type"]);
            for applied in &amounts {
                table.add_row(vec![
                    applied.amount.to_string(),
                    applied
                        .damage_type
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ]);
            }
            println!("{table}");
            println!("  {} health {health}", target.name);
        })?;
    }

    if save {
        write_json(target_path, &target)?;
    }
    Ok(())
}
