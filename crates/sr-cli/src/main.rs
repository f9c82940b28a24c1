//! Command-line roller for Stormroll.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sr_mechanics::{AdvantageMode, Attribute, Skill};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "stormroll",
    about = "Stormroll: skill tests, damage, and item use for the Cosmere tabletop game",
    version,
    propagate_version = true
)]
struct Cli {
    /// Seed for the dice; the same seed repeats the same rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Rules configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Advantage and plot die flags shared by every skill test.
#[derive(Args, Debug, Clone, Default)]
struct TestArgs {
    /// Roll two d20 and keep the highest
    #[arg(long, conflicts_with = "disadvantage")]
    advantage: bool,

    /// Roll two d20 and keep the lowest
    #[arg(long)]
    disadvantage: bool,

    /// Raise the stakes: add the plot die
    #[arg(long)]
    plot: bool,

    /// Extra formula parts, e.g. `--part +2`
    #[arg(long = "part", allow_hyphen_values = true)]
    parts: Vec<String>,

    /// Lowest d20 face that is an opportunity
    #[arg(long)]
    opportunity: Option<u32>,

    /// Highest d20 face that is a complication
    #[arg(long)]
    complication: Option<u32>,
}

impl TestArgs {
    fn advantage_mode(&self) -> AdvantageMode {
        match (self.advantage, self.disadvantage) {
            (true, _) => AdvantageMode::Advantage,
            (_, true) => AdvantageMode::Disadvantage,
            _ => AdvantageMode::None,
        }
    }
}

/// A retroactive change to saved rolls.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum RetroAction {
    /// Give the skill test advantage
    Advantage,
    /// Give the skill test disadvantage
    Disadvantage,
    /// Turn the damage into a critical hit
    Critical,
    /// Roll everything again
    Repeat,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice formula
    Roll {
        /// Formula, e.g. "2d20kh + 3" or "{2d6,1d8}kh"
        formula: String,

        /// Every die rolls its highest face
        #[arg(long, conflicts_with = "min")]
        max: bool,

        /// Every die rolls a 1
        #[arg(long)]
        min: bool,
    },

    /// Roll a skill test for an actor
    Test {
        /// Skill id or name (e.g. ath, athletics); omit for a raw attribute test
        skill: Option<Skill>,

        /// Actor sheet (JSON)
        #[arg(short, long)]
        actor: PathBuf,

        /// Attribute to roll with instead of the skill's
        #[arg(long)]
        attribute: Option<Attribute>,

        #[command(flatten)]
        test: TestArgs,
    },

    /// Roll an item's damage
    Damage {
        /// Actor sheet (JSON)
        #[arg(short, long)]
        actor: PathBuf,

        /// Item (JSON)
        #[arg(short, long)]
        item: PathBuf,

        /// Formula replacing the item's damage formula
        #[arg(long)]
        formula: Option<String>,

        /// Skill whose rank adds to damage
        #[arg(long)]
        skill: Option<Skill>,

        /// Attribute that adds to damage
        #[arg(long)]
        attribute: Option<Attribute>,

        /// Roll as a critical hit
        #[arg(long)]
        critical: bool,
    },

    /// Attack with an item: skill test and damage
    Attack {
        /// Actor sheet (JSON)
        #[arg(short, long)]
        actor: PathBuf,

        /// Item (JSON)
        #[arg(short, long)]
        item: PathBuf,

        #[command(flatten)]
        test: TestArgs,

        /// Roll damage as a critical hit
        #[arg(long)]
        critical: bool,
    },

    /// Use an item: pay its cost, roll, and record the changes
    Use {
        /// Actor sheet (JSON)
        #[arg(short, long)]
        actor: PathBuf,

        /// Item (JSON)
        #[arg(short, long)]
        item: PathBuf,

        #[command(flatten)]
        test: TestArgs,

        /// Pay the activation cost
        #[arg(long, conflicts_with = "no_consume")]
        consume: bool,

        /// Skip the activation cost
        #[arg(long)]
        no_consume: bool,

        /// Roll damage as a critical hit
        #[arg(long)]
        critical: bool,

        /// Write the updated actor and item back to their files
        #[arg(long)]
        save: bool,
    },

    /// Apply saved damage rolls to a target
    Apply {
        /// Target actor sheet (JSON)
        #[arg(short, long)]
        target: PathBuf,

        /// Rolls saved with --json
        #[arg(short, long, required_unless_present = "focus")]
        rolls: Option<PathBuf>,

        /// Apply graze damage
        #[arg(long)]
        graze: bool,

        /// Added to each roll before the multiplier
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        modifier: i64,

        /// Damage multiplier; negative heals
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        multiplier: f64,

        /// Reduce focus by one plus the modifier instead of dealing damage
        #[arg(long)]
        focus: bool,

        /// Write the updated target back to its file
        #[arg(long)]
        save: bool,
    },

    /// Change saved rolls after the fact
    Retro {
        /// What to change
        action: RetroAction,

        /// Rolls saved with --json
        #[arg(short, long)]
        rolls: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = commands::Context::new(cli.seed, cli.json, cli.config.as_deref()).and_then(
        |mut ctx| match cli.command {
            Commands::Roll { formula, max, min } => commands::roll::run(&mut ctx, &formula, max, min),
            Commands::Test {
                skill,
                actor,
                attribute,
                test,
            } => commands::test::run(&mut ctx, &actor, skill, attribute, &test),
            Commands::Damage {
                actor,
                item,
                formula,
                skill,
                attribute,
                critical,
            } => commands::damage::run(
                &mut ctx,
                &actor,
                &item,
                sr_mechanics::DamageOptions {
                    skill,
                    attribute,
                    override_formula: formula,
                    critical,
                },
            ),
            Commands::Attack {
                actor,
                item,
                test,
                critical,
            } => commands::attack::run(&mut ctx, &actor, &item, &test, critical),
            Commands::Use {
                actor,
                item,
                test,
                consume,
                no_consume,
                critical,
                save,
            } => {
                let should_consume = match (consume, no_consume) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                commands::use_item::run(
                    &mut ctx,
                    &actor,
                    &item,
                    &test,
                    should_consume,
                    critical,
                    save,
                )
            }
            Commands::Apply {
                target,
                rolls,
                graze,
                modifier,
                multiplier,
                focus,
                save,
            } => {
                let options = sr_mechanics::ApplyOptions {
                    use_graze: graze,
                    modifier,
                    multiplier,
                };
                commands::apply::run(&ctx, &target, rolls.as_deref(), &options, focus, save)
            }
            Commands::Retro { action, rolls } => commands::retro::run(&mut ctx, action, &rolls),
        },
    );

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
