pub mod apply;
pub mod attack;
pub mod damage;
pub mod output;
pub mod retro;
pub mod roll;
pub mod test;
pub mod use_item;

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sr_dice::{DiceError, RngSource, render_formula_error};
use sr_mechanics::{
    ActorSheet, AttackOptions, AttackOutcome, Item, ItemUsage, MechError, RollOutcome, RulesConfig,
};

use crate::TestArgs;

/// Settings and dice shared by every command.
pub struct Context {
    pub json: bool,
    pub config: RulesConfig,
    pub source: RngSource<StdRng>,
}

impl Context {
    pub fn new(seed: Option<u64>, json: bool, config: Option<&Path>) -> Result<Self, String> {
        let config = match config {
            Some(path) => RulesConfig::from_path(path)
                .map_err(|e| format!("cannot load {}: {e}", path.display()))?,
            None => RulesConfig::default(),
        };
        let seed = seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, "seeded dice");
        Ok(Self {
            json,
            config,
            source: RngSource::seeded(seed),
        })
    }

    /// Print `value` as JSON, or call `human` for terminal output.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<(), String> {
        if self.json {
            let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
            println!("{text}");
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Saved rolls, in any shape the commands print with `--json`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RollsDocument {
    Usage(ItemUsage),
    One(Box<RollOutcome>),
    Many(Vec<RollOutcome>),
    Attack(AttackOutcome),
}

impl RollsDocument {
    fn into_rolls(self) -> Vec<RollOutcome> {
        match self {
            RollsDocument::Usage(usage) => usage.rolls,
            RollsDocument::One(roll) => vec![*roll],
            RollsDocument::Many(rolls) => rolls,
            RollsDocument::Attack(attack) => attack.into_rolls(),
        }
    }
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    fs::write(path, text + "\n").map_err(|e| format!("cannot write {}: {e}", path.display()))
}

pub fn load_actor(path: &Path) -> Result<ActorSheet, String> {
    ActorSheet::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

pub fn load_item(path: &Path) -> Result<Item, String> {
    Item::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

pub fn load_rolls(path: &Path) -> Result<Vec<RollOutcome>, String> {
    let document: RollsDocument = serde_json::from_str(&read(path)?)
        .map_err(|_| format!("{}: not a saved roll", path.display()))?;
    Ok(document.into_rolls())
}

/// Turn a mechanics error into the message `main` prints, showing formula
/// errors with their source span first.
pub fn failure(err: MechError) -> String {
    if let MechError::MalformedFormula(dice @ (DiceError::Lex { .. } | DiceError::Parse { .. })) =
        &err
    {
        eprint!("{}", render_formula_error(dice));
    }
    err.to_string()
}

/// Attack options from the shared test flags.
pub fn attack_options(test: &TestArgs, critical: bool) -> AttackOptions {
    AttackOptions {
        advantage_mode: Some(test.advantage_mode()),
        plot_die: test.plot.then_some(true),
        parts: (!test.parts.is_empty()).then(|| test.parts.clone()),
        opportunity: test.opportunity,
        complication: test.complication,
        critical,
        ..AttackOptions::default()
    }
}
