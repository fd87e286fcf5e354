use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six character ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Strength.
    #[serde(rename = "STR")]
    Strength,
    /// Constitution.
    #[serde(rename = "CON")]
    Constitution,
    /// Dexterity.
    #[serde(rename = "DEX")]
    Dexterity,
    /// Intelligence.
    #[serde(rename = "INT")]
    Intelligence,
    /// Wisdom.
    #[serde(rename = "WIS")]
    Wisdom,
    /// Charisma.
    #[serde(rename = "CHA")]
    Charisma,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Attribute; 6] = [
        Self::Strength,
        Self::Constitution,
        Self::Dexterity,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// The three-letter abbreviation used on sheets and on the wire.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Strength => "STR",
            Self::Constitution => "CON",
            Self::Dexterity => "DEX",
            Self::Intelligence => "INT",
            Self::Wisdom => "WIS",
            Self::Charisma => "CHA",
        }
    }

    /// Parse an abbreviation or full name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Some(Self::Strength),
            "con" | "constitution" => Some(Self::Constitution),
            "dex" | "dexterity" => Some(Self::Dexterity),
            "int" | "intelligence" => Some(Self::Intelligence),
            "wis" | "wisdom" => Some(Self::Wisdom),
            "cha" | "charisma" => Some(Self::Charisma),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// The six raw ability scores of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    /// Strength score.
    #[serde(rename = "STR")]
    pub strength: i32,
    /// Constitution score.
    #[serde(rename = "CON")]
    pub constitution: i32,
    /// Dexterity score.
    #[serde(rename = "DEX")]
    pub dexterity: i32,
    /// Intelligence score.
    #[serde(rename = "INT")]
    pub intelligence: i32,
    /// Wisdom score.
    #[serde(rename = "WIS")]
    pub wisdom: i32,
    /// Charisma score.
    #[serde(rename = "CHA")]
    pub charisma: i32,
}

impl AttributeSet {
    /// Create a set with every score equal to `value`.
    pub fn uniform(value: i32) -> Self {
        Self {
            strength: value,
            constitution: value,
            dexterity: value,
            intelligence: value,
            wisdom: value,
            charisma: value,
        }
    }

    /// Read one score.
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Constitution => self.constitution,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    /// Overwrite one score.
    pub fn set(&mut self, attribute: Attribute, value: i32) {
        *self.slot(attribute) = value;
    }

    /// Iterate over `(attribute, score)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    /// Return a copy with `delta` added to every score.
    ///
    /// Sums saturate at the `i32` bounds.
    pub fn apply(&self, delta: &AttributeDelta) -> Self {
        let mut next = *self;
        for attribute in Attribute::ALL {
            let slot = next.slot(attribute);
            *slot = slot.saturating_add(delta.get(attribute));
        }
        next
    }

    fn slot(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        }
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(a, v)| format!("{a} {v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Pending or committed changes to the six scores.
///
/// Keys that are absent on the wire default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDelta {
    /// Change to strength.
    #[serde(rename = "STR")]
    pub strength: i32,
    /// Change to constitution.
    #[serde(rename = "CON")]
    pub constitution: i32,
    /// Change to dexterity.
    #[serde(rename = "DEX")]
    pub dexterity: i32,
    /// Change to intelligence.
    #[serde(rename = "INT")]
    pub intelligence: i32,
    /// Change to wisdom.
    #[serde(rename = "WIS")]
    pub wisdom: i32,
    /// Change to charisma.
    #[serde(rename = "CHA")]
    pub charisma: i32,
}

impl AttributeDelta {
    /// The change recorded for one attribute.
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Constitution => self.constitution,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    /// Overwrite the change for one attribute.
    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Wisdom => self.wisdom = value,
            Attribute::Charisma => self.charisma = value,
        }
    }

    /// Add `amount` to the change for one attribute.
    pub fn add(&mut self, attribute: Attribute, amount: i32) {
        self.set(attribute, self.get(attribute).saturating_add(amount));
    }

    /// Sum of all changes, saturating at the `i32` bounds.
    pub fn total(&self) -> i32 {
        Attribute::ALL
            .iter()
            .fold(0i32, |sum, a| sum.saturating_add(self.get(*a)))
    }

    /// Number of attributes with a non-zero change.
    pub fn touched(&self) -> usize {
        Attribute::ALL.iter().filter(|a| self.get(**a) != 0).count()
    }

    /// Returns true if no attribute changes.
    pub fn is_empty(&self) -> bool {
        self.touched() == 0
    }

    /// Iterate over the non-zero changes in sheet order.
    pub fn changes(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::ALL
            .into_iter()
            .map(|a| (a, self.get(a)))
            .filter(|(_, v)| *v != 0)
    }
}

impl fmt::Display for AttributeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no changes");
        }
        let parts: Vec<String> = self.changes().map(|(a, v)| format!("{a} {v:+}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}
