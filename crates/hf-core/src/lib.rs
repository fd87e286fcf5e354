//! Core types for Heroforge: attributes, class tables, characters, and campaigns.
//!
//! This crate holds the data the progression engine reads and writes. It does
//! no rule computation; the campaign container doubles as an in-memory
//! [`CampaignStore`] so the engine can be exercised without a database.

/// The six ability scores and changes to them.
pub mod attribute;
/// Campaign container with JSON persistence.
pub mod campaign;
/// Character snapshots, IDs, and level-up history.
pub mod character;
/// Class reference tables and willpower progression.
pub mod class;
/// Error types used throughout the crate.
pub mod error;
/// The storage seam consumed by the progression engine.
pub mod store;

/// Re-export attribute types.
pub use attribute::{Attribute, AttributeDelta, AttributeSet};
/// Re-export campaign types.
pub use campaign::{Campaign, CampaignMeta, CampaignSettings};
/// Re-export character types.
pub use character::{CharacterId, CharacterSnapshot, LevelUpRecord};
/// Re-export class types.
pub use class::{CharacterClass, ClassBaseAttributes, WillpowerProgression};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the storage trait.
pub use store::CampaignStore;
