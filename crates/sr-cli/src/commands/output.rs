//! Terminal rendering of roll outcomes.

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sr_dice::DieResult;
use sr_mechanics::apply::DamageSummary;
use sr_mechanics::{RollKind, RollOutcome, UsageCommit};

fn label(kind: RollKind) -> &'static str {
    match kind {
        RollKind::SkillTest => "Test",
        RollKind::Attack => "Attack",
        RollKind::Damage => "Damage",
    }
}

/// Die faces, with discarded dice struck through.
pub fn faces(dice: &[DieResult]) -> String {
    let faces: Vec<String> = dice
        .iter()
        .map(|d| {
            let face = d.face.to_string();
            if d.discarded {
                face.dimmed().strikethrough().to_string()
            } else if d.success {
                face.green().to_string()
            } else if d.failure {
                face.red().to_string()
            } else {
                face
            }
        })
        .collect();
    format!("[{}]", faces.join(", "))
}

/// Opportunity, complication, and critical markers for a roll.
pub fn notes(outcome: &RollOutcome) -> String {
    let mut notes = Vec::new();
    if outcome.rolled_opportunity() {
        notes.push("opportunity".green().to_string());
    }
    if outcome.rolled_complication() {
        notes.push("complication".red().to_string());
    }
    if outcome.is_critical {
        notes.push("critical".yellow().bold().to_string());
    }
    if let Some(kind) = outcome.damage_type {
        notes.push(kind.to_string());
    }
    notes.join(" ")
}

/// Print one roll and its graze roll.
pub fn print_outcome(outcome: &RollOutcome) {
    let source = outcome
        .source
        .as_deref()
        .map(|s| format!(" ({s})"))
        .unwrap_or_default();
    println!(
        "  {}{source}: {} = {}  {}  {}",
        label(outcome.kind).bold(),
        outcome.formula,
        outcome.total.to_string().bold(),
        faces(&outcome.dice),
        notes(outcome),
    );
    if let Some(graze) = &outcome.graze {
        println!(
            "    graze: {} = {}  {}",
            graze.formula,
            graze.total.to_string().bold(),
            faces(&graze.dice),
        );
    }
}

/// Print several rolls as a table, with a damage summary when any roll
/// dealt damage.
pub fn print_rolls(rolls: &[RollOutcome]) {
    if rolls.is_empty() {
        println!("  No rolls.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Roll", "Formula", "Dice", "Total", "Graze", "Notes"]);
    for roll in rolls {
        table.add_row(vec![
            label(roll.kind).to_string(),
            roll.formula.clone(),
            faces(&roll.dice),
            roll.total.to_string(),
            roll.graze_total().map(|g| g.to_string()).unwrap_or_default(),
            notes(roll),
        ]);
    }
    println!("{table}");

    let summary = DamageSummary::from_rolls(rolls);
    if !summary.formula.is_empty() {
        println!(
            "  Damage {} (graze {}){}",
            summary.total.to_string().bold(),
            summary.graze_total,
            if summary.critical { " critical" } else { "" },
        );
    }
}

/// Print pending or applied changes from an item use.
pub fn print_commits(commits: &[UsageCommit]) {
    for commit in commits {
        let line = match commit {
            UsageCommit::SetResource { resource, value } => format!("{resource} -> {value}"),
            UsageCommit::SetUses { value } => format!("uses -> {value}"),
            UsageCommit::ActivateMode { modality, item_id } => format!("{modality} mode: {item_id}"),
            UsageCommit::Unsupported { action } => format!("{action} skipped").yellow().to_string(),
        };
        println!("  {line}");
    }
}
