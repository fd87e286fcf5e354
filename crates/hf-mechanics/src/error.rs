//! Error types for the progression engine.

use hf_core::{Attribute, CharacterId, CoreError};

use crate::commit::CommitError;
use crate::levelup::StepKind;

/// Errors that can occur while deriving stats or driving a level-up.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The class table has no row for the requested level.
    #[error("class '{class}' has no row for level {level}")]
    MissingClassRow {
        /// Class name.
        class: String,
        /// Requested level.
        level: u32,
    },

    /// The character does not exist in the store.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// The action is not available in the current step.
    #[error("cannot {action} during the {step} step")]
    WrongStep {
        /// What was attempted.
        action: &'static str,
        /// The step the session is in.
        step: StepKind,
    },

    /// `Next` is not enabled yet.
    #[error("cannot leave the {step} step: {reason}")]
    StepIncomplete {
        /// The step the session is in.
        step: StepKind,
        /// What is still missing.
        reason: String,
    },

    /// An attribute point cannot be added.
    #[error("cannot raise {attribute}: {reason}")]
    IllegalIncrement {
        /// The attribute.
        attribute: Attribute,
        /// Why the point was refused.
        reason: String,
    },

    /// An attribute point cannot be removed.
    #[error("cannot lower {attribute}: {reason}")]
    IllegalDecrement {
        /// The attribute.
        attribute: Attribute,
        /// Why the point was refused.
        reason: String,
    },

    /// The skill is not on the character's skill list.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// A skill point would exceed the budget or the skill's maximum rank.
    #[error("cannot add a point to {skill}: {reason}")]
    SkillRejected {
        /// The skill.
        skill: String,
        /// Why the point was refused.
        reason: String,
    },

    /// A hit point value is outside the range allowed in this mode.
    #[error("hit points must be between {min} and {max}, got {value}")]
    HitPointsOutOfRange {
        /// The rejected value.
        value: i64,
        /// Smallest legal value.
        min: u32,
        /// Largest legal value.
        max: u32,
    },

    /// Hit points are already set; change them first.
    #[error("hit points already set to {0}")]
    HitPointsAlreadySet(u32),

    /// Advanced mode only accepts manual hit point entry.
    #[error("automatic hit point rolls are not available in advanced mode")]
    RollUnavailable,

    /// A commit is in flight; every other transition is locked.
    #[error("a commit is already in flight")]
    CommitInFlight,

    /// `complete_commit` was called without a matching `begin_commit`.
    #[error("no commit is in flight")]
    NoCommitInFlight,

    /// The session has been committed or cancelled.
    #[error("the level-up session is closed ({0})")]
    SessionClosed(StepKind),

    /// The experience total does not reach a higher level.
    #[error("{experience} XP does not reach a level above {level}")]
    NoLevelGained {
        /// Current level.
        level: u32,
        /// Experience total that was checked.
        experience: u64,
    },

    /// Every queued level has been committed.
    #[error("the level-up sequence has already finished")]
    SequenceFinished,

    /// Progression configuration is invalid.
    #[error("invalid progression config: {0}")]
    InvalidConfig(String),

    /// The commit endpoint rejected or failed the request.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// A store read or write failed.
    #[error(transparent)]
    Store(#[from] CoreError),
}

/// Convenience result type for progression operations.
pub type MechResult<T> = Result<T, MechError>;
