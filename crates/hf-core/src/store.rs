use std::collections::BTreeMap;

use crate::character::{CharacterId, CharacterSnapshot, LevelUpRecord};
use crate::class::{CharacterClass, ClassBaseAttributes};
use crate::error::CoreResult;

/// Authoritative character and class data as seen by the progression engine.
///
/// Reads return owned snapshots so callers never hold a borrow across a write.
pub trait CampaignStore {
    /// Look up a character by ID.
    fn character(&self, id: CharacterId) -> Option<CharacterSnapshot>;

    /// Look up a class by name.
    fn class(&self, name: &str) -> Option<CharacterClass>;

    /// The class table row for `level`. Missing classes or rows yield `None`.
    fn class_base_attributes(&self, class: &str, level: u32) -> Option<ClassBaseAttributes> {
        self.class(class)?.at_level(level).cloned()
    }

    /// Points currently invested per skill for a character.
    fn character_skills(&self, id: CharacterId) -> BTreeMap<String, u32> {
        self.character(id).map(|c| c.skills).unwrap_or_default()
    }

    /// Replace a stored character in a single write.
    fn save_character(&mut self, character: CharacterSnapshot) -> CoreResult<()>;

    /// Overwrite a character's experience total.
    fn set_experience(&mut self, id: CharacterId, experience: u64) -> CoreResult<()>;

    /// Append a history record. Stores without history ignore it.
    fn record_level_up(&mut self, _record: LevelUpRecord) {}
}
