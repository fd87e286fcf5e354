//! Character progression engine for Heroforge.
//!
//! Derives displayed stats from raw attributes and class tables, and runs
//! the level-up workflow: attribute, skill, and hit point allocation for a
//! single level, sequencing across several levels, and the commit endpoint
//! that re-validates and writes the result.

pub mod commit;
pub mod config;
pub mod derive;
pub mod dice;
pub mod error;
pub mod levelup;
pub mod progression;
pub mod sequence;
pub mod validate;

pub use commit::{CommitError, CommitPayload, CommitRequest, ErrorBody, commit_level_up};
pub use config::ProgressionConfig;
pub use derive::{
    AbilityModifiers, DefensiveStats, DerivedStats, MiscStats, OffensiveStats, ability_modifier,
    derive_for_character, derive_stats, initiative_formula,
};
pub use dice::{DiceExpr, Die, HitPointRoll, roll_hit_points};
pub use error::{MechError, MechResult};
pub use levelup::{
    AllocationMode, AttributeAllocation, HitPointEntry, HitPointGain, LevelUpSession,
    PendingLevelUp, SkillAllocation, Step, StepKind, attribute_cap,
};
pub use progression::ExperienceTable;
pub use sequence::{LevelStep, LevelUpSequence, SequenceProgress};
pub use validate::{ValidationIssue, validate_campaign};
