//! Roll data for skill tests and damage rolls.

use sr_dice::RollData;

use crate::sheet::{ActorSheet, Attribute, AttributeScore, Skill};

/// Roll data and modifier for a skill test.
///
/// The modifier is skill rank plus attribute value plus attribute bonus.
/// Without a skill the rank is 0; without an attribute it adds nothing.
pub fn skill_test_data(
    actor: &ActorSheet,
    skill: Option<Skill>,
    attribute: Option<Attribute>,
) -> (RollData, i64) {
    let rank = skill.map_or(0, |s| actor.skill(s).rank);
    let score = attribute.map_or(AttributeScore::default(), |a| actor.attribute(a));
    let modifier = attribute_modifier(rank, score);

    let mut data = actor.roll_data();
    data.set("mod", modifier);
    data.set("skill.rank", rank);
    data.set("skill.mod", skill.map_or(0, |s| actor.skill_mod(s)));
    if let Some(skill) = skill {
        data.set("skill.id", skill.id());
    }
    if let Some(attribute) = attribute.or(skill.map(|s| actor.skill(s).attribute)) {
        data.set("skill.attribute", attribute.id());
    }
    data.set("attribute", score.value);
    (data, modifier)
}

/// Skill rank plus attribute value and bonus, saturating at the `i64` bounds.
fn attribute_modifier(rank: i64, score: AttributeScore) -> i64 {
    rank.saturating_add(score.value).saturating_add(score.bonus)
}

/// Roll data and modifier for a damage roll.
///
/// The modifier is `None` when neither a skill nor an attribute applies,
/// which keeps it out of the formula entirely.
pub fn damage_data(
    actor: &ActorSheet,
    skill: Option<Skill>,
    attribute: Option<Attribute>,
) -> (RollData, Option<i64>) {
    let mut data = actor.roll_data();
    if skill.is_none() && attribute.is_none() {
        return (data, None);
    }

    let rank = skill.map_or(0, |s| actor.skill(s).rank);
    let score = attribute.map_or(AttributeScore::default(), |a| actor.attribute(a));
    let modifier = attribute_modifier(rank, score);

    data.set("mod", modifier);
    if let Some(skill) = skill {
        data.set("skill.id", skill.id());
        data.set("skill.rank", rank);
        data.set("skill.mod", actor.skill_mod(skill));
    }
    if attribute.is_some() {
        data.set("attribute", score.value);
    }
    (data, Some(modifier))
}
