use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::character::{CharacterId, CharacterSnapshot, LevelUpRecord};
use crate::class::CharacterClass;
use crate::error::{CoreError, CoreResult};
use crate::store::CampaignStore;

/// Metadata about the campaign itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMeta {
    /// Campaign name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl CampaignMeta {
    /// Create metadata stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Progression settings stored alongside the campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSettings {
    /// Experience required to reach each level, starting with level 2.
    /// Empty means the default table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience_thresholds: Vec<u64>,
    /// Seed for hit point rolls. `None` seeds from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A campaign: classes, characters, and level-up history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Campaign metadata.
    pub meta: CampaignMeta,
    /// Progression settings.
    #[serde(default)]
    pub settings: CampaignSettings,
    classes: Vec<CharacterClass>,
    characters: Vec<CharacterSnapshot>,
    #[serde(default)]
    history: Vec<LevelUpRecord>,
}

impl Campaign {
    /// Create an empty campaign.
    pub fn new(meta: CampaignMeta) -> Self {
        Self {
            meta,
            settings: CampaignSettings::default(),
            classes: Vec::new(),
            characters: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Parse a campaign from JSON and reject duplicate names.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let campaign: Self = serde_json::from_str(json)?;
        campaign.check_unique_names()?;
        Ok(campaign)
    }

    /// Serialize the campaign as pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // -----------------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------------

    /// Add a class. Names are unique, case-insensitively.
    pub fn add_class(&mut self, class: CharacterClass) -> CoreResult<()> {
        if self.find_class(&class.name).is_some() {
            return Err(CoreError::DuplicateName(class.name));
        }
        self.classes.push(class);
        Ok(())
    }

    /// Find a class by name, case-insensitively.
    pub fn find_class(&self, name: &str) -> Option<&CharacterClass> {
        let lower = name.to_lowercase();
        self.classes.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// The class a character belongs to, or fail.
    pub fn class_of(&self, character: &CharacterSnapshot) -> CoreResult<&CharacterClass> {
        self.find_class(&character.class)
            .ok_or_else(|| CoreError::ClassNotFound(character.class.clone()))
    }

    /// All classes in insertion order.
    pub fn classes(&self) -> &[CharacterClass] {
        &self.classes
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Add a character. Returns its ID.
    pub fn add_character(&mut self, character: CharacterSnapshot) -> CoreResult<CharacterId> {
        if self.find_character(&character.name).is_some() {
            return Err(CoreError::DuplicateName(character.name));
        }
        let id = character.id;
        self.characters.push(character);
        Ok(id)
    }

    /// Get a character by ID.
    pub fn get_character(&self, id: CharacterId) -> Option<&CharacterSnapshot> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Find a character by name, case-insensitively.
    pub fn find_character(&self, name: &str) -> Option<&CharacterSnapshot> {
        let lower = name.to_lowercase();
        self.characters
            .iter()
            .find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a character ID by name, or fail.
    pub fn character_id(&self, name: &str) -> CoreResult<CharacterId> {
        self.find_character(name)
            .map(|c| c.id)
            .ok_or_else(|| CoreError::CharacterNameNotFound(name.to_string()))
    }

    /// All characters in insertion order.
    pub fn characters(&self) -> &[CharacterSnapshot] {
        &self.characters
    }

    /// Committed level-ups, oldest first.
    pub fn history(&self) -> &[LevelUpRecord] {
        &self.history
    }

    fn character_mut(&mut self, id: CharacterId) -> CoreResult<&mut CharacterSnapshot> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CoreError::CharacterNotFound(id))
    }

    fn touch(&mut self) {
        self.meta.updated_at = Utc::now();
    }

    fn check_unique_names(&self) -> CoreResult<()> {
        let mut seen = std::collections::HashSet::new();
        for name in self.classes.iter().map(|c| c.name.to_lowercase()) {
            if !seen.insert(format!("class:{name}")) {
                return Err(CoreError::DuplicateName(name));
            }
        }
        for name in self.characters.iter().map(|c| c.name.to_lowercase()) {
            if !seen.insert(format!("character:{name}")) {
                return Err(CoreError::DuplicateName(name));
            }
        }
        Ok(())
    }
}

impl CampaignStore for Campaign {
    fn character(&self, id: CharacterId) -> Option<CharacterSnapshot> {
        self.get_character(id).cloned()
    }

    fn class(&self, name: &str) -> Option<CharacterClass> {
        self.find_class(name).cloned()
    }

    fn save_character(&mut self, character: CharacterSnapshot) -> CoreResult<()> {
        let slot = self.character_mut(character.id)?;
        *slot = character;
        self.touch();
        Ok(())
    }

    fn set_experience(&mut self, id: CharacterId, experience: u64) -> CoreResult<()> {
        self.character_mut(id)?.experience = experience;
        self.touch();
        Ok(())
    }

    fn record_level_up(&mut self, record: LevelUpRecord) {
        self.history.push(record);
    }
}
