//! Actor sheets: attributes, skills, and resources.
//!
//! Only the statistics rolls read are modelled. Sheets are plain data
//! loaded from JSON; the caller persists any changes a commit makes.

pub mod track;

pub use track::Track;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sr_dice::RollData;

use crate::error::{MechError, MechResult};

/// The six attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Strength.
    #[serde(rename = "str")]
    Strength,
    /// Speed.
    #[serde(rename = "spd")]
    Speed,
    /// Intellect.
    #[serde(rename = "int")]
    Intellect,
    /// Willpower.
    #[serde(rename = "wil")]
    Willpower,
    /// Awareness.
    #[serde(rename = "awa")]
    Awareness,
    /// Presence.
    #[serde(rename = "pre")]
    Presence,
}

impl Attribute {
    /// Every attribute, in sheet order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Speed,
        Attribute::Intellect,
        Attribute::Willpower,
        Attribute::Awareness,
        Attribute::Presence,
    ];

    /// Short id used in documents and roll data.
    pub fn id(self) -> &'static str {
        match self {
            Attribute::Strength => "str",
            Attribute::Speed => "spd",
            Attribute::Intellect => "int",
            Attribute::Willpower => "wil",
            Attribute::Awareness => "awa",
            Attribute::Presence => "pre",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Speed => "Speed",
            Attribute::Intellect => "Intellect",
            Attribute::Willpower => "Willpower",
            Attribute::Awareness => "Awareness",
            Attribute::Presence => "Presence",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.id().eq_ignore_ascii_case(s) || a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MechError::UnknownAttribute(s.to_string()))
    }
}

/// Skills, each tied to a default attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Skill {
    #[serde(rename = "agi")]
    Agility,
    #[serde(rename = "ath")]
    Athletics,
    #[serde(rename = "hwp")]
    HeavyWeapons,
    #[serde(rename = "lwp")]
    LightWeapons,
    #[serde(rename = "stl")]
    Stealth,
    #[serde(rename = "thv")]
    Thievery,
    #[serde(rename = "cra")]
    Crafting,
    #[serde(rename = "ded")]
    Deduction,
    #[serde(rename = "dis")]
    Discipline,
    #[serde(rename = "intm")]
    Intimidation,
    #[serde(rename = "lor")]
    Lore,
    #[serde(rename = "med")]
    Medicine,
    #[serde(rename = "dec")]
    Deception,
    #[serde(rename = "ins")]
    Insight,
    #[serde(rename = "lea")]
    Leadership,
    #[serde(rename = "prc")]
    Perception,
    #[serde(rename = "prs")]
    Persuasion,
    #[serde(rename = "sur")]
    Survival,
}

impl Skill {
    /// Every skill, grouped by attribute.
    pub const ALL: [Skill; 18] = [
        Skill::Agility,
        Skill::Athletics,
        Skill::HeavyWeapons,
        Skill::LightWeapons,
        Skill::Stealth,
        Skill::Thievery,
        Skill::Crafting,
        Skill::Deduction,
        Skill::Discipline,
        Skill::Intimidation,
        Skill::Lore,
        Skill::Medicine,
        Skill::Deception,
        Skill::Insight,
        Skill::Leadership,
        Skill::Perception,
        Skill::Persuasion,
        Skill::Survival,
    ];

    /// Short id used in documents and roll data.
    pub fn id(self) -> &'static str {
        match self {
            Skill::Agility => "agi",
            Skill::Athletics => "ath",
            Skill::HeavyWeapons => "hwp",
            Skill::LightWeapons => "lwp",
            Skill::Stealth => "stl",
            Skill::Thievery => "thv",
            Skill::Crafting => "cra",
            Skill::Deduction => "ded",
            Skill::Discipline => "dis",
            Skill::Intimidation => "intm",
            Skill::Lore => "lor",
            Skill::Medicine => "med",
            Skill::Deception => "dec",
            Skill::Insight => "ins",
            Skill::Leadership => "lea",
            Skill::Perception => "prc",
            Skill::Persuasion => "prs",
            Skill::Survival => "sur",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Skill::Agility => "Agility",
            Skill::Athletics => "Athletics",
            Skill::HeavyWeapons => "Heavy Weaponry",
            Skill::LightWeapons => "Light Weaponry",
            Skill::Stealth => "Stealth",
            Skill::Thievery => "Thievery",
            Skill::Crafting => "Crafting",
            Skill::Deduction => "Deduction",
            Skill::Discipline => "Discipline",
            Skill::Intimidation => "Intimidation",
            Skill::Lore => "Lore",
            Skill::Medicine => "Medicine",
            Skill::Deception => "Deception",
            Skill::Insight => "Insight",
            Skill::Leadership => "Leadership",
            Skill::Perception => "Perception",
            Skill::Persuasion => "Persuasion",
            Skill::Survival => "Survival",
        }
    }

    /// The attribute this skill rolls with unless told otherwise.
    pub fn default_attribute(self) -> Attribute {
        match self {
            Skill::Athletics | Skill::HeavyWeapons => Attribute::Strength,
            Skill::Agility | Skill::LightWeapons | Skill::Stealth | Skill::Thievery => {
                Attribute::Speed
            }
            Skill::Crafting | Skill::Deduction | Skill::Lore | Skill::Medicine => {
                Attribute::Intellect
            }
            Skill::Discipline | Skill::Intimidation => Attribute::Willpower,
            Skill::Insight | Skill::Perception | Skill::Survival => Attribute::Awareness,
            Skill::Deception | Skill::Leadership | Skill::Persuasion => Attribute::Presence,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Skill {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['_', '-', ' '], "");
        Self::ALL
            .into_iter()
            .find(|k| {
                k.id().eq_ignore_ascii_case(s)
                    || format!("{k:?}").eq_ignore_ascii_case(&wanted)
                    || k.name().replace(' ', "").eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| MechError::UnknownSkill(s.to_string()))
    }
}

/// Resources an activation can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Health.
    #[serde(rename = "hea")]
    Health,
    /// Focus.
    #[serde(rename = "foc")]
    Focus,
    /// Investiture.
    #[serde(rename = "inv")]
    Investiture,
}

impl Resource {
    /// Every resource.
    pub const ALL: [Resource; 3] = [Resource::Health, Resource::Focus, Resource::Investiture];

    /// Short id used in documents and roll data.
    pub fn id(self) -> &'static str {
        match self {
            Resource::Health => "hea",
            Resource::Focus => "foc",
            Resource::Investiture => "inv",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Health => "health",
            Resource::Focus => "focus",
            Resource::Investiture => "investiture",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.id().eq_ignore_ascii_case(s) || r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MechError::UnknownResource(s.to_string()))
    }
}

/// An attribute's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeScore {
    /// Base value.
    pub value: i64,
    /// Bonus from effects and equipment.
    #[serde(default)]
    pub bonus: i64,
}

/// A skill's rank and the attribute it rolls with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillScore {
    /// Ranks invested in the skill.
    pub rank: i64,
    /// Attribute the skill rolls with.
    pub attribute: Attribute,
}

/// An actor's mechanical state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSheet {
    /// Actor name.
    pub name: String,
    /// Attribute scores. Missing attributes score 0.
    #[serde(default)]
    pub attributes: BTreeMap<Attribute, AttributeScore>,
    /// Skill ranks. Missing skills have rank 0.
    #[serde(default)]
    pub skills: BTreeMap<Skill, SkillScore>,
    /// Resource tracks.
    #[serde(default)]
    pub resources: BTreeMap<Resource, Track>,
    /// Active modes, keyed by modality and naming the item that set them.
    #[serde(default)]
    pub modes: BTreeMap<String, String>,
}

impl ActorSheet {
    /// An empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a sheet from JSON.
    pub fn from_json(json: &str) -> MechResult<Self> {
        serde_json::from_str(json).map_err(|e| MechError::Config(format!("actor: {e}")))
    }

    /// Builder: set an attribute score.
    pub fn with_attribute(mut self, attribute: Attribute, value: i64, bonus: i64) -> Self {
        self.attributes
            .insert(attribute, AttributeScore { value, bonus });
        self
    }

    /// Builder: set a skill rank, rolling with its default attribute.
    pub fn with_skill(mut self, skill: Skill, rank: i64) -> Self {
        self.skills.insert(
            skill,
            SkillScore {
                rank,
                attribute: skill.default_attribute(),
            },
        );
        self
    }

    /// Builder: add a resource track.
    pub fn with_resource(mut self, resource: Resource, value: i64, max: i64) -> Self {
        self.resources
            .insert(resource, Track::with_range(value, 0, max));
        self
    }

    /// An attribute's score, zero if unset.
    pub fn attribute(&self, attribute: Attribute) -> AttributeScore {
        self.attributes.get(&attribute).copied().unwrap_or_default()
    }

    /// A skill's score, rank 0 with the default attribute if unset.
    pub fn skill(&self, skill: Skill) -> SkillScore {
        self.skills.get(&skill).copied().unwrap_or(SkillScore {
            rank: 0,
            attribute: skill.default_attribute(),
        })
    }

    /// A skill's modifier: rank plus its attribute's value and bonus.
    pub fn skill_mod(&self, skill: Skill) -> i64 {
        let score = self.skill(skill);
        let attribute = self.attribute(score.attribute);
        score.rank + attribute.value + attribute.bonus
    }

    /// A resource track, if the actor has it.
    pub fn resource(&self, resource: Resource) -> Option<&Track> {
        self.resources.get(&resource)
    }

    /// Mutable form of [`ActorSheet::resource`].
    pub fn resource_mut(&mut self, resource: Resource) -> Option<&mut Track> {
        self.resources.get_mut(&resource)
    }

    /// Activate a mode, replacing whatever held the modality before.
    pub fn set_mode(&mut self, modality: impl Into<String>, item_id: impl Into<String>) {
        self.modes.insert(modality.into(), item_id.into());
    }

    /// The actor's own roll data: attributes, skills, and resources by id.
    pub fn roll_data(&self) -> RollData {
        let mut data = RollData::new();
        for attribute in Attribute::ALL {
            let score = self.attribute(attribute);
            data.set(&format!("attributes.{}.value", attribute.id()), score.value);
            data.set(&format!("attributes.{}.bonus", attribute.id()), score.bonus);
        }
        for skill in Skill::ALL {
            data.set(&format!("skills.{}.rank", skill.id()), self.skill(skill).rank);
            data.set(&format!("skills.{}.mod", skill.id()), self.skill_mod(skill));
        }
        for (resource, track) in &self.resources {
            data.set(&format!("resources.{}.value", resource.id()), track.value);
            data.set(&format!("resources.{}.max", resource.id()), track.max);
        }
        data
    }
}
