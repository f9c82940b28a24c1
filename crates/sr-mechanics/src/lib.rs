//! Roll mechanics for Stormroll: skill tests, damage, attacks, and item use.
//!
//! Resolvers read an [`ActorSheet`] and an [`Item`], roll against an
//! injected die source, and return serialisable [`RollOutcome`]s. State on
//! the sheet or item only changes when the caller commits an
//! [`ItemUsage`] or applies damage.

pub mod apply;
pub mod compose;
pub mod config;
pub mod error;
pub mod item;
pub mod sheet;
pub mod usage;

/// Re-export damage application.
pub use apply::{ApplyOptions, DamageSummary, apply_damage, reduce_focus};
/// Re-export the roll composer.
pub use compose::{
    AdvantageMode, AttackOptions, AttackOutcome, DamageOptions, FastForward, RollConfigurator,
    RollKind, RollOutcome, RollRequest, Thresholds, roll_attack, roll_damage, roll_skill,
};
/// Re-export configuration.
pub use config::RulesConfig;
/// Re-export error types.
pub use error::{MechError, MechResult};
/// Re-export item types.
pub use item::{Item, ItemKind};
/// Re-export sheet types.
pub use sheet::{ActorSheet, Attribute, Resource, Skill, Track};
/// Re-export item use.
pub use usage::{ItemUsage, UsageCommit, UseOptions, use_item};
