//! The level-up commit endpoint.
//!
//! The endpoint does not trust the client's step history. It re-derives the
//! attribute cap and point budget from the request's own level and mode,
//! applies them to the stored attributes, and writes nothing unless every
//! check passes.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use hf_core::{AttributeDelta, CampaignStore, CharacterId, CharacterSnapshot, LevelUpRecord};

use crate::levelup::attributes::{
    ADVANCED_POINTS, AllocationMode, MIN_SCORE, NORMAL_MAX_TOUCHED, NORMAL_POINTS, cap_for_mode,
};

/// Lowest attribute total accepted in advanced mode.
pub const ADVANCED_MIN_TOTAL: i32 = -10;

/// A commit request as it arrives on the wire, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    /// Level to advance to.
    pub new_level: Option<u32>,
    /// Experience total to store.
    #[serde(rename = "newXP")]
    pub new_xp: Option<u64>,
    /// Points added per attribute.
    pub attribute_changes: Option<AttributeDelta>,
    /// Hit points gained.
    pub hp_gain: Option<u32>,
    /// Whether the advanced rule set was used.
    pub advanced_mode: Option<bool>,
    /// New skill points per skill. Optional; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_allocations: Option<BTreeMap<String, u32>>,
}

impl TryFrom<CommitPayload> for CommitRequest {
    type Error = CommitError;

    fn try_from(payload: CommitPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            new_level: payload.new_level.ok_or(CommitError::MissingField("newLevel"))?,
            new_xp: payload.new_xp.ok_or(CommitError::MissingField("newXP"))?,
            attribute_changes: payload
                .attribute_changes
                .ok_or(CommitError::MissingField("attributeChanges"))?,
            hp_gain: payload.hp_gain.ok_or(CommitError::MissingField("hpGain"))?,
            advanced_mode: payload
                .advanced_mode
                .ok_or(CommitError::MissingField("advancedMode"))?,
            skill_allocations: payload.skill_allocations.unwrap_or_default(),
        })
    }
}

/// A complete commit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    /// Level to advance to.
    pub new_level: u32,
    /// Experience total to store.
    #[serde(rename = "newXP")]
    pub new_xp: u64,
    /// Points added per attribute.
    pub attribute_changes: AttributeDelta,
    /// Hit points gained.
    pub hp_gain: u32,
    /// Whether the advanced rule set was used.
    pub advanced_mode: bool,
    /// New skill points per skill.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skill_allocations: BTreeMap<String, u32>,
}

impl CommitRequest {
    /// Parse a JSON request body.
    pub fn from_json(json: &str) -> Result<Self, CommitError> {
        let payload: CommitPayload = serde_json::from_str(json)
            .map_err(|e| CommitError::InvalidAttributeAllocation(format!("malformed request: {e}")))?;
        payload.try_into()
    }
}

/// Why the endpoint refused or failed a commit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// A required field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The new level is not exactly one above the current level.
    #[error("invalid level progression: {0}")]
    InvalidLevelProgression(String),

    /// The attribute or skill points break the budget rules.
    #[error("invalid attribute allocation: {0}")]
    InvalidAttributeAllocation(String),

    /// A resulting attribute leaves the legal range.
    #[error("attribute out of bounds: {0}")]
    AttributeOutOfBounds(String),

    /// The character does not exist or belongs to someone else.
    #[error("character not found")]
    NotFound,

    /// No requester was identified.
    #[error("unauthorized")]
    Unauthorized,

    /// The store failed while writing.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommitError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingField(_)
            | Self::InvalidLevelProgression(_)
            | Self::InvalidAttributeAllocation(_)
            | Self::AttributeOutOfBounds(_) => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Internal(_) => 500,
        }
    }

    /// A stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidLevelProgression(_) => "invalid_level_progression",
            Self::InvalidAttributeAllocation(_) => "invalid_attribute_allocation",
            Self::AttributeOutOfBounds(_) => "attribute_out_of_bounds",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns true if the session cannot continue after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound | Self::Unauthorized)
    }

    /// The JSON error body sent with the status.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status(),
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status.
    pub status: u16,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Check a request against the stored character without writing anything.
///
/// Returns the character as it would be after the commit.
pub fn validate_commit(
    character: &CharacterSnapshot,
    skill_budget: u32,
    request: &CommitRequest,
) -> Result<CharacterSnapshot, CommitError> {
    if request.new_level != character.level + 1 {
        return Err(CommitError::InvalidLevelProgression(format!(
            "level {} cannot follow level {}",
            request.new_level, character.level
        )));
    }

    let mode = AllocationMode::from_flag(request.advanced_mode);
    let delta = &request.attribute_changes;
    let total = delta.total();
    match mode {
        AllocationMode::Normal => {
            if total != NORMAL_POINTS {
                return Err(CommitError::InvalidAttributeAllocation(format!(
                    "exactly {NORMAL_POINTS} points must be spent, got {total}"
                )));
            }
            if delta.touched() > NORMAL_MAX_TOUCHED {
                return Err(CommitError::InvalidAttributeAllocation(format!(
                    "at most {NORMAL_MAX_TOUCHED} attributes may change, got {}",
                    delta.touched()
                )));
            }
        }
        AllocationMode::Advanced => {
            if !(ADVANCED_MIN_TOTAL..=ADVANCED_POINTS).contains(&total) {
                return Err(CommitError::InvalidAttributeAllocation(format!(
                    "advanced total must be between {ADVANCED_MIN_TOTAL} and {ADVANCED_POINTS}, got {total}"
                )));
            }
        }
    }

    let cap = cap_for_mode(request.new_level, mode);
    let attributes = character.attributes.apply(delta);
    for (attribute, value) in attributes.iter() {
        if !(MIN_SCORE..=cap).contains(&value) {
            return Err(CommitError::AttributeOutOfBounds(format!(
                "{attribute} would be {value}, outside {MIN_SCORE}..={cap}"
            )));
        }
    }

    let skill_total = request
        .skill_allocations
        .values()
        .fold(0u32, |sum, points| sum.saturating_add(*points));
    if skill_total > skill_budget {
        return Err(CommitError::InvalidAttributeAllocation(format!(
            "{skill_total} skill points exceed the budget of {skill_budget}"
        )));
    }
    if let Some(unknown) = request
        .skill_allocations
        .keys()
        .find(|name| !character.skills.contains_key(*name))
    {
        return Err(CommitError::InvalidAttributeAllocation(format!(
            "unknown skill: {unknown}"
        )));
    }

    let mut updated = character.clone();
    updated.level = request.new_level;
    updated.experience = request.new_xp;
    updated.attributes = attributes;
    let gain = i32::try_from(request.hp_gain).unwrap_or(i32::MAX);
    updated.max_hp = updated.max_hp.saturating_add(gain);
    updated.current_hp = updated.max_hp;
    for (skill, points) in &request.skill_allocations {
        let rank = updated.skills.entry(skill.clone()).or_insert(0);
        *rank = rank.saturating_add(*points);
    }
    Ok(updated)
}

/// Apply a level-up commit for `requester`.
///
/// The requester must own the character. A character owned by someone else
/// is reported as not found. On success the character, its history, and
/// the returned snapshot all reflect the new level.
pub fn commit_level_up<S: CampaignStore + ?Sized>(
    store: &mut S,
    requester: Option<&str>,
    id: CharacterId,
    request: &CommitRequest,
) -> Result<CharacterSnapshot, CommitError> {
    let requester = requester.ok_or(CommitError::Unauthorized)?;
    let character = store
        .character(id)
        .filter(|c| c.owner == requester)
        .ok_or(CommitError::NotFound)?;

    let skill_budget = store
        .class_base_attributes(&character.class, request.new_level)
        .map_or(0, |row| row.skill_ranks);
    let updated = validate_commit(&character, skill_budget, request).inspect_err(|e| {
        tracing::info!(character = %id, code = e.code(), error = %e, "level-up commit rejected");
    })?;

    store
        .save_character(updated.clone())
        .map_err(|e| CommitError::Internal(e.to_string()))?;
    store.record_level_up(LevelUpRecord {
        character: id,
        from_level: character.level,
        to_level: updated.level,
        hp_gain: request.hp_gain,
        advanced: request.advanced_mode,
        at: Utc::now(),
    });
    tracing::info!(
        character = %id,
        name = %updated.name,
        level = updated.level,
        hp_gain = request.hp_gain,
        max_hp = updated.max_hp,
        "level-up committed"
    );
    Ok(updated)
}
