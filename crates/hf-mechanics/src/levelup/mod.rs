//! The single-level level-up workflow.
//!
//! A [`LevelUpSession`] walks one character from level N to N+1 through
//! `Attributes -> Skills -> HitPoints -> Confirm -> Committed`. Each step is a
//! variant of [`Step`] carrying exactly the state valid for it, so a hit point
//! gain cannot exist while attributes are still being allocated.
//!
//! Commit is two-phase: [`LevelUpSession::begin_commit`] produces the request
//! and locks the session, [`LevelUpSession::complete_commit`] applies the
//! endpoint's answer. While a commit is in flight every other transition is
//! refused.

pub mod attributes;
pub mod hitpoints;
pub mod skills;

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;

use hf_core::{Attribute, AttributeDelta, AttributeSet, CampaignStore, CharacterId, CharacterSnapshot};

use crate::commit::{CommitError, CommitRequest};
use crate::derive::ability_modifier;
use crate::dice::Die;
use crate::error::{MechError, MechResult};
use crate::sequence::LevelStep;

pub use attributes::{AllocationMode, AttributeAllocation, attribute_cap, cap_for_mode};
pub use hitpoints::{HitPointEntry, HitPointGain, HitPointSource};
pub use skills::SkillAllocation;

/// Which step a session is in, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepKind {
    /// Spending attribute points.
    Attributes,
    /// Spending skill points.
    Skills,
    /// Rolling or entering hit points.
    HitPoints,
    /// Reviewing the full delta before commit.
    Confirm,
    /// The level-up has been written.
    Committed,
    /// The player walked away.
    Cancelled,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attributes => "attributes",
            Self::Skills => "skills",
            Self::HitPoints => "hit points",
            Self::Confirm => "confirm",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// The consolidated delta shown on the confirm step and sent on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLevelUp {
    /// The character advancing.
    pub character: CharacterId,
    /// Level before the commit.
    pub from_level: u32,
    /// Level after the commit.
    pub new_level: u32,
    /// Experience total written with the level.
    pub new_experience: u64,
    /// Rule set the points were spent under.
    pub mode: AllocationMode,
    /// Points added per attribute.
    pub attribute_changes: AttributeDelta,
    /// Scores after the change.
    pub resulting_attributes: AttributeSet,
    /// New skill points per skill.
    pub skill_allocations: BTreeMap<String, u32>,
    /// Hit points gained.
    pub hit_points: HitPointGain,
}

impl PendingLevelUp {
    /// The wire request for the commit endpoint.
    pub fn to_request(&self) -> CommitRequest {
        CommitRequest {
            new_level: self.new_level,
            new_xp: self.new_experience,
            attribute_changes: self.attribute_changes,
            hp_gain: self.hit_points.value,
            advanced_mode: self.mode.is_advanced(),
            skill_allocations: self.skill_allocations.clone(),
        }
    }
}

/// A step together with the state it owns.
///
/// Later steps carry the state of earlier ones so `Back` can restore it.
#[derive(Debug, Clone)]
pub enum Step {
    /// Spending attribute points.
    Attributes {
        /// Pending attribute points.
        attributes: AttributeAllocation,
    },
    /// Spending skill points.
    Skills {
        /// Attribute points from the previous step.
        attributes: AttributeAllocation,
        /// Pending skill points.
        skills: SkillAllocation,
    },
    /// Rolling or entering hit points.
    HitPoints {
        /// Attribute points from the first step.
        attributes: AttributeAllocation,
        /// Skill points from the previous step.
        skills: SkillAllocation,
        /// The hit point input.
        hit_points: HitPointEntry,
    },
    /// Reviewing the delta.
    Confirm {
        /// Attribute points from the first step.
        attributes: AttributeAllocation,
        /// Skill points from the second step.
        skills: SkillAllocation,
        /// The hit point input, kept for `Back`.
        hit_points: HitPointEntry,
        /// The delta to commit.
        pending: PendingLevelUp,
    },
    /// The level-up has been written.
    Committed {
        /// The character as returned by the commit endpoint.
        character: CharacterSnapshot,
    },
    /// The session was cancelled.
    Cancelled,
}

impl Step {
    /// The variant without its data.
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Attributes { .. } => StepKind::Attributes,
            Self::Skills { .. } => StepKind::Skills,
            Self::HitPoints { .. } => StepKind::HitPoints,
            Self::Confirm { .. } => StepKind::Confirm,
            Self::Committed { .. } => StepKind::Committed,
            Self::Cancelled => StepKind::Cancelled,
        }
    }
}

/// One character advancing one level.
#[derive(Debug, Clone)]
pub struct LevelUpSession {
    character: CharacterSnapshot,
    target: LevelStep,
    hit_die: Die,
    skill_budget: u32,
    step: Step,
    in_flight: bool,
}

impl LevelUpSession {
    /// Open a session at the `Attributes` step for `target`.
    ///
    /// Reads the character, its class hit die, the skill budget for the
    /// target level (0 when the class has no row), and its current skills.
    pub fn open<S: CampaignStore + ?Sized>(
        store: &S,
        id: CharacterId,
        target: LevelStep,
    ) -> MechResult<Self> {
        let character = store.character(id).ok_or(MechError::CharacterNotFound(id))?;
        let class = store.class(&character.class);
        let hit_die = class
            .as_ref()
            .and_then(|c| c.hit_die.as_deref())
            .and_then(Die::from_hit_die);
        let hit_die = hit_die.unwrap_or_else(|| {
            tracing::warn!(
                class = %character.class,
                hit_die = ?class.as_ref().and_then(|c| c.hit_die.clone()),
                "no usable hit die, falling back to {}",
                hitpoints::DEFAULT_HIT_DIE
            );
            hitpoints::DEFAULT_HIT_DIE
        });
        let skill_budget = store
            .class_base_attributes(&character.class, target.target_level)
            .map_or(0, |row| row.skill_ranks);
        let mut character = character;
        character.skills = store.character_skills(id);

        let attributes = AttributeAllocation::new(character.attributes, target.target_level);
        tracing::debug!(
            character = %character.id,
            from = character.level,
            to = target.target_level,
            %hit_die,
            skill_budget,
            "level-up session opened"
        );
        Ok(Self {
            character,
            target,
            hit_die,
            skill_budget,
            step: Step::Attributes { attributes },
            in_flight: false,
        })
    }

    /// The character as it was when the session opened.
    pub fn character(&self) -> &CharacterSnapshot {
        &self.character
    }

    /// The level and experience this session is advancing to.
    pub fn target(&self) -> &LevelStep {
        &self.target
    }

    /// The class hit die in use.
    pub fn hit_die(&self) -> Die {
        self.hit_die
    }

    /// Skill points granted for the target level.
    pub fn skill_budget(&self) -> u32 {
        self.skill_budget
    }

    /// The current step and its state.
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// The current step kind.
    pub fn kind(&self) -> StepKind {
        self.step.kind()
    }

    /// Returns true while a commit is awaiting its result.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns true once committed or cancelled.
    pub fn is_closed(&self) -> bool {
        matches!(self.step, Step::Committed { .. } | Step::Cancelled)
    }

    /// Attribute allocation, in any step that has one.
    pub fn attributes(&self) -> Option<&AttributeAllocation> {
        match &self.step {
            Step::Attributes { attributes }
            | Step::Skills { attributes, .. }
            | Step::HitPoints { attributes, .. }
            | Step::Confirm { attributes, .. } => Some(attributes),
            Step::Committed { .. } | Step::Cancelled => None,
        }
    }

    /// Skill allocation, from the `Skills` step on.
    pub fn skills(&self) -> Option<&SkillAllocation> {
        match &self.step {
            Step::Skills { skills, .. }
            | Step::HitPoints { skills, .. }
            | Step::Confirm { skills, .. } => Some(skills),
            _ => None,
        }
    }

    /// Hit point input, from the `HitPoints` step on.
    pub fn hit_points(&self) -> Option<&HitPointEntry> {
        match &self.step {
            Step::HitPoints { hit_points, .. } | Step::Confirm { hit_points, .. } => {
                Some(hit_points)
            }
            _ => None,
        }
    }

    /// The delta awaiting commit, on the `Confirm` step.
    pub fn pending(&self) -> Option<&PendingLevelUp> {
        match &self.step {
            Step::Confirm { pending, .. } => Some(pending),
            _ => None,
        }
    }

    /// Why `Next` is disabled, if it is.
    pub fn next_blocker(&self) -> Option<String> {
        if self.in_flight {
            return Some("a commit is in flight".to_string());
        }
        match &self.step {
            Step::Attributes { attributes } => attributes.incomplete_reason(),
            Step::Skills { skills, .. } => skills.incomplete_reason(),
            Step::HitPoints { hit_points, .. } => hit_points.incomplete_reason(),
            Step::Confirm { .. } => Some("commit to finish the level-up".to_string()),
            Step::Committed { .. } | Step::Cancelled => Some("the session is closed".to_string()),
        }
    }

    /// Move to the next step.
    pub fn next(&mut self) -> MechResult<StepKind> {
        self.ensure_open()?;
        let from = self.kind();
        if matches!(from, StepKind::Confirm) {
            return Err(MechError::WrongStep {
                action: "advance",
                step: from,
            });
        }
        if let Some(reason) = self.next_blocker() {
            return Err(MechError::StepIncomplete { step: from, reason });
        }

        let step = std::mem::replace(&mut self.step, Step::Cancelled);
        self.step = match step {
            Step::Attributes { attributes } => {
                let skills = SkillAllocation::new(
                    self.skill_budget,
                    self.target.target_level,
                    self.character.skills.clone(),
                );
                Step::Skills { attributes, skills }
            }
            Step::Skills { attributes, skills } => {
                let hit_points = self.hit_point_entry(&attributes);
                Step::HitPoints {
                    attributes,
                    skills,
                    hit_points,
                }
            }
            Step::HitPoints {
                attributes,
                skills,
                hit_points,
            } => match hit_points.gain().cloned() {
                Some(gain) => {
                    let pending = self.pending_level_up(&attributes, &skills, gain);
                    Step::Confirm {
                        attributes,
                        skills,
                        hit_points,
                        pending,
                    }
                }
                None => Step::HitPoints {
                    attributes,
                    skills,
                    hit_points,
                },
            },
            other => other,
        };
        self.trace_transition(from);
        Ok(self.kind())
    }

    /// Return to the previous step, keeping that step's state and dropping
    /// the state of the step being left.
    pub fn back(&mut self) -> MechResult<StepKind> {
        self.ensure_open()?;
        let from = self.kind();
        if matches!(from, StepKind::Attributes) {
            return Err(MechError::WrongStep {
                action: "go back",
                step: from,
            });
        }

        let step = std::mem::replace(&mut self.step, Step::Cancelled);
        self.step = match step {
            Step::Skills { attributes, .. } => Step::Attributes { attributes },
            Step::HitPoints {
                attributes, skills, ..
            } => Step::Skills { attributes, skills },
            Step::Confirm {
                attributes,
                skills,
                hit_points,
                ..
            } => Step::HitPoints {
                attributes,
                skills,
                hit_points,
            },
            other => other,
        };
        self.trace_transition(from);
        Ok(self.kind())
    }

    /// Abandon the session. Reverting experience is up to the caller.
    pub fn cancel(&mut self) -> MechResult<()> {
        self.ensure_open()?;
        let from = self.kind();
        self.step = Step::Cancelled;
        self.trace_transition(from);
        Ok(())
    }

    /// Switch between normal and advanced rules. Discards pending attribute points.
    pub fn set_advanced(&mut self, advanced: bool) -> MechResult<()> {
        self.ensure_open()?;
        match &mut self.step {
            Step::Attributes { attributes } => {
                attributes.set_mode(AllocationMode::from_flag(advanced));
                tracing::debug!(advanced, "allocation mode set");
                Ok(())
            }
            other => Err(MechError::WrongStep {
                action: "change the allocation mode",
                step: other.kind(),
            }),
        }
    }

    /// Add one point to an attribute.
    pub fn increment_attribute(&mut self, attribute: Attribute) -> MechResult<()> {
        self.attributes_mut("raise an attribute")?.increment(attribute)
    }

    /// Remove one pending point from an attribute.
    pub fn decrement_attribute(&mut self, attribute: Attribute) -> MechResult<()> {
        self.attributes_mut("lower an attribute")?.decrement(attribute)
    }

    /// Add one point to a skill.
    pub fn increment_skill(&mut self, skill: &str) -> MechResult<()> {
        self.skills_mut("add a skill point")?.increment(skill)
    }

    /// Remove one pending point from a skill.
    pub fn decrement_skill(&mut self, skill: &str) -> MechResult<()> {
        self.skills_mut("remove a skill point")?.decrement(skill)
    }

    /// Add several points to a skill.
    pub fn allocate_skill(&mut self, skill: &str, points: u32) -> MechResult<()> {
        self.skills_mut("add skill points")?.allocate(skill, points)
    }

    /// Roll the hit die.
    pub fn roll_hit_points<R: Rng>(&mut self, rng: &mut R) -> MechResult<HitPointGain> {
        self.hit_points_mut("roll hit points")?.roll(rng).cloned()
    }

    /// Enter hit points by hand.
    pub fn enter_hit_points(&mut self, value: i64) -> MechResult<HitPointGain> {
        self.hit_points_mut("enter hit points")?.enter(value).cloned()
    }

    /// Clear the hit point value without leaving the step.
    pub fn change_hit_points(&mut self) -> MechResult<()> {
        self.hit_points_mut("change hit points")?.change();
        Ok(())
    }

    /// Lock the session and hand out the request to send.
    pub fn begin_commit(&mut self) -> MechResult<CommitRequest> {
        self.ensure_open()?;
        let Step::Confirm { pending, .. } = &self.step else {
            return Err(MechError::WrongStep {
                action: "commit",
                step: self.kind(),
            });
        };
        let request = pending.to_request();
        self.in_flight = true;
        tracing::debug!(character = %self.character.id, level = request.new_level, "commit started");
        Ok(request)
    }

    /// Apply the endpoint's answer to an in-flight commit.
    ///
    /// On success the session is committed. On failure it stays on `Confirm`
    /// with the pending delta intact, ready to resubmit.
    pub fn complete_commit(
        &mut self,
        result: Result<CharacterSnapshot, CommitError>,
    ) -> MechResult<CharacterSnapshot> {
        if !self.in_flight {
            return Err(MechError::NoCommitInFlight);
        }
        self.in_flight = false;
        match result {
            Ok(character) => {
                self.step = Step::Committed {
                    character: character.clone(),
                };
                self.trace_transition(StepKind::Confirm);
                Ok(character)
            }
            Err(e) => {
                tracing::debug!(character = %self.character.id, error = %e, "commit failed");
                Err(MechError::Commit(e))
            }
        }
    }

    /// Run both commit phases against `endpoint`.
    pub fn commit_with<F>(&mut self, endpoint: F) -> MechResult<CharacterSnapshot>
    where
        F: FnOnce(&CommitRequest) -> Result<CharacterSnapshot, CommitError>,
    {
        let request = self.begin_commit()?;
        let result = endpoint(&request);
        self.complete_commit(result)
    }

    fn ensure_open(&self) -> MechResult<()> {
        if self.in_flight {
            return Err(MechError::CommitInFlight);
        }
        if self.is_closed() {
            return Err(MechError::SessionClosed(self.kind()));
        }
        Ok(())
    }

    fn attributes_mut(&mut self, action: &'static str) -> MechResult<&mut AttributeAllocation> {
        self.ensure_open()?;
        match &mut self.step {
            Step::Attributes { attributes } => Ok(attributes),
            other => Err(MechError::WrongStep {
                action,
                step: other.kind(),
            }),
        }
    }

    fn skills_mut(&mut self, action: &'static str) -> MechResult<&mut SkillAllocation> {
        self.ensure_open()?;
        match &mut self.step {
            Step::Skills { skills, .. } => Ok(skills),
            other => Err(MechError::WrongStep {
                action,
                step: other.kind(),
            }),
        }
    }

    fn hit_points_mut(&mut self, action: &'static str) -> MechResult<&mut HitPointEntry> {
        self.ensure_open()?;
        match &mut self.step {
            Step::HitPoints { hit_points, .. } => Ok(hit_points),
            other => Err(MechError::WrongStep {
                action,
                step: other.kind(),
            }),
        }
    }

    fn hit_point_entry(&self, attributes: &AttributeAllocation) -> HitPointEntry {
        let con_modifier = ability_modifier(attributes.value(Attribute::Constitution));
        HitPointEntry::new(self.hit_die, con_modifier, attributes.mode())
    }

    fn pending_level_up(
        &self,
        attributes: &AttributeAllocation,
        skills: &SkillAllocation,
        hit_points: HitPointGain,
    ) -> PendingLevelUp {
        PendingLevelUp {
            character: self.character.id,
            from_level: self.character.level,
            new_level: self.target.target_level,
            new_experience: self.target.target_experience,
            mode: attributes.mode(),
            attribute_changes: *attributes.pending(),
            resulting_attributes: attributes.resulting(),
            skill_allocations: skills.pending().clone(),
            hit_points,
        }
    }

    fn trace_transition(&self, from: StepKind) {
        tracing::debug!(
            character = %self.character.id,
            level = self.target.target_level,
            %from,
            to = %self.kind(),
            "level-up step"
        );
    }
}
