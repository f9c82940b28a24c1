use colored::Colorize;
use serde_json::json;
use sr_dice::{EvalMode, Roll, render_formula_error};

use super::Context;
use super::output::faces;

pub fn run(ctx: &mut Context, formula: &str, max: bool, min: bool) -> Result<(), String> {
    let mode = match (max, min) {
        (true, _) => EvalMode::Maximize,
        (_, true) => EvalMode::Minimize,
        _ => EvalMode::Normal,
    };

    let mut roll = Roll::parse_with_limits(formula, ctx.config.limits()).map_err(|e| {
        eprint!("{}", render_formula_error(&e));
        e.to_string()
    })?;
    let total = roll
        .evaluate(&mut ctx.source, mode)
        .map_err(|e| e.to_string())?;

    let report = json!({
        "formula": roll.formula(),
        "total": total,
        "dice": roll.results(),
    });
    ctx.emit(&report, |_| {
        println!(
            "  {} = {}  {}",
            roll.formula(),
            total.to_string().bold(),
            faces(&roll.results())
        );
    })
}
