use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::AttributeSet;

/// Unique identifier for every character in a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Generate a new random character ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The persisted state of a character that progression reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    /// Stable identifier.
    #[serde(default)]
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Player who owns the character.
    #[serde(default)]
    pub owner: String,
    /// Name of the character's class.
    pub class: String,
    /// Current level (1-based).
    pub level: u32,
    /// Total experience points.
    #[serde(default)]
    pub experience: u64,
    /// Current ability scores.
    pub attributes: AttributeSet,
    /// Current hit points.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Points invested per skill name.
    #[serde(default)]
    pub skills: BTreeMap<String, u32>,
}

impl CharacterSnapshot {
    /// Create a level 1 character with default scores and no hit points.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            owner: String::new(),
            class: class.into(),
            level: 1,
            experience: 0,
            attributes: AttributeSet::default(),
            current_hp: 0,
            max_hp: 0,
            skills: BTreeMap::new(),
        }
    }

    /// Set the owning player.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Set the level.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the ability scores.
    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set current and maximum hit points to `hp`.
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.current_hp = hp;
        self.max_hp = hp;
        self
    }

    /// Set the experience total.
    pub fn with_experience(mut self, experience: u64) -> Self {
        self.experience = experience;
        self
    }

    /// Add a skill with some invested points.
    pub fn with_skill(mut self, name: impl Into<String>, points: u32) -> Self {
        self.skills.insert(name.into(), points);
        self
    }
}

/// One committed level-up, kept as campaign history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpRecord {
    /// The character that advanced.
    pub character: CharacterId,
    /// Level before the commit.
    pub from_level: u32,
    /// Level after the commit.
    pub to_level: u32,
    /// Hit points gained.
    pub hp_gain: u32,
    /// Whether the advanced rule set was used.
    pub advanced: bool,
    /// When the level-up was committed.
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let c = CharacterSnapshot::new("Brenna", "Fighter")
            .with_owner("alice")
            .with_level(3)
            .with_hp(24)
            .with_experience(3_000)
            .with_skill("Climb", 2);
        assert_eq!(c.level, 3);
        assert_eq!(c.current_hp, 24);
        assert_eq!(c.max_hp, 24);
        assert_eq!(c.owner, "alice");
        assert_eq!(c.skills.get("Climb"), Some(&2));
    }

    #[test]
    fn id_display_is_short() {
        let id = CharacterId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn snapshot_json_round_trip_keeps_id() {
        let c = CharacterSnapshot::new("Brenna", "Fighter");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"currentHp\""));
        let back: CharacterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
