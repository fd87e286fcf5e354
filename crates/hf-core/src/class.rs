use std::fmt;

use serde::{Deserialize, Serialize};

/// How a class's willpower pool grows with level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WillpowerProgression {
    /// One point every second level.
    Even,
    /// One point every level.
    Every,
    /// No willpower from level.
    #[default]
    None,
}

impl fmt::Display for WillpowerProgression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => write!(f, "EVEN"),
            Self::Every => write!(f, "EVERY"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Class reference data for one level: the numbers that do not come from attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBaseAttributes {
    /// The class level this row applies to.
    pub level: u32,
    /// Base attack bonus.
    pub attack: i32,
    /// Base spell attack bonus.
    pub spell_attack: i32,
    /// Base armor class.
    pub armor_class: i32,
    /// Base fortitude save.
    pub fortitude: i32,
    /// Base reflex save.
    pub reflex: i32,
    /// Base will save.
    pub will: i32,
    /// Damage bonus, already formatted (e.g. "+1d4").
    #[serde(default)]
    pub damage_bonus: String,
    /// Leadership score.
    #[serde(default)]
    pub leadership: i32,
    /// Skill points granted when reaching this level.
    #[serde(default)]
    pub skill_ranks: u32,
    /// Slayer bonus, for classes that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slayer: Option<String>,
    /// Rage uses or bonus, for classes that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rage: Option<String>,
    /// Brutal advantage, for classes that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brutal_advantage: Option<String>,
}

/// A character class: hit die, willpower progression, and per-level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterClass {
    /// Class name, unique within a campaign.
    pub name: String,
    /// Hit die string such as "1d8". Absent or malformed values fall back to d6.
    #[serde(default)]
    pub hit_die: Option<String>,
    /// Willpower progression mode.
    #[serde(default)]
    pub willpower: WillpowerProgression,
    /// One row per level.
    #[serde(default)]
    pub levels: Vec<ClassBaseAttributes>,
}

impl CharacterClass {
    /// Create a class with no level rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hit_die: None,
            willpower: WillpowerProgression::None,
            levels: Vec::new(),
        }
    }

    /// Set the hit die string.
    pub fn with_hit_die(mut self, hit_die: impl Into<String>) -> Self {
        self.hit_die = Some(hit_die.into());
        self
    }

    /// Set the willpower progression.
    pub fn with_willpower(mut self, willpower: WillpowerProgression) -> Self {
        self.willpower = willpower;
        self
    }

    /// Append a level row.
    pub fn with_level(mut self, row: ClassBaseAttributes) -> Self {
        self.levels.push(row);
        self
    }

    /// The row for `level`, if the class table has one.
    pub fn at_level(&self, level: u32) -> Option<&ClassBaseAttributes> {
        self.levels.iter().find(|row| row.level == level)
    }

    /// Highest level the table covers, or 0 for an empty table.
    pub fn max_level(&self) -> u32 {
        self.levels.iter().map(|row| row.level).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: u32, skill_ranks: u32) -> ClassBaseAttributes {
        ClassBaseAttributes {
            level,
            skill_ranks,
            ..Default::default()
        }
    }

    #[test]
    fn at_level_finds_row() {
        let class = CharacterClass::new("Rogue")
            .with_level(row(1, 8))
            .with_level(row(2, 4));
        assert_eq!(class.at_level(2).map(|r| r.skill_ranks), Some(4));
        assert!(class.at_level(3).is_none());
        assert_eq!(class.max_level(), 2);
    }

    #[test]
    fn empty_class_has_no_levels() {
        let class = CharacterClass::new("Commoner");
        assert_eq!(class.max_level(), 0);
        assert!(class.hit_die.is_none());
        assert_eq!(class.willpower, WillpowerProgression::None);
    }

    #[test]
    fn willpower_wire_format() {
        let parsed: WillpowerProgression = serde_json::from_str("\"EVEN\"").unwrap();
        assert_eq!(parsed, WillpowerProgression::Even);
        assert_eq!(
            serde_json::to_string(&WillpowerProgression::Every).unwrap(),
            "\"EVERY\""
        );
    }

    #[test]
    fn row_wire_format_is_camel_case() {
        let json = r#"{
            "level": 3, "attack": 3, "spellAttack": 1, "armorClass": 12,
            "fortitude": 3, "reflex": 1, "will": 1, "damageBonus": "+1",
            "skillRanks": 2, "rage": "2/day"
        }"#;
        let row: ClassBaseAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(row.spell_attack, 1);
        assert_eq!(row.armor_class, 12);
        assert_eq!(row.rage.as_deref(), Some("2/day"));
        assert_eq!(row.leadership, 0);
    }
}
