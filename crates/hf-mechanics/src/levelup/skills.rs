//! Skill point allocation for a single level-up.

use std::collections::BTreeMap;

use crate::error::{MechError, MechResult};

/// New skill points on top of what the character already invested.
///
/// The budget is the class's skill ranks at the target level. A skill is
/// fully invested once its current plus pending points reach `max_rank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillAllocation {
    budget: u32,
    max_rank: u32,
    current: BTreeMap<String, u32>,
    pending: BTreeMap<String, u32>,
}

impl SkillAllocation {
    /// Start an empty allocation.
    pub fn new(budget: u32, max_rank: u32, current: BTreeMap<String, u32>) -> Self {
        Self {
            budget,
            max_rank,
            current,
            pending: BTreeMap::new(),
        }
    }

    /// Points granted for this level.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Highest rank any skill may reach.
    pub fn max_rank(&self) -> u32 {
        self.max_rank
    }

    /// Points allocated so far.
    pub fn allocated(&self) -> u32 {
        self.pending.values().sum()
    }

    /// Points still to allocate.
    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.allocated())
    }

    /// Non-zero pending points per skill.
    pub fn pending(&self) -> &BTreeMap<String, u32> {
        &self.pending
    }

    /// Skill names with current and pending points, in name order.
    pub fn skills(&self) -> impl Iterator<Item = (&str, u32, u32)> + '_ {
        self.current.iter().map(|(name, points)| {
            let pending = self.pending.get(name).copied().unwrap_or(0);
            (name.as_str(), *points, pending)
        })
    }

    /// Returns true if the skill cannot take another point this level.
    pub fn is_fully_invested(&self, skill: &str) -> bool {
        let current = self.current.get(skill).copied().unwrap_or(0);
        let pending = self.pending.get(skill).copied().unwrap_or(0);
        current + pending >= self.max_rank
    }

    /// Add one point to `skill`.
    pub fn increment(&mut self, skill: &str) -> MechResult<()> {
        if !self.current.contains_key(skill) {
            return Err(MechError::UnknownSkill(skill.to_string()));
        }
        if self.remaining() == 0 {
            return Err(MechError::SkillRejected {
                skill: skill.to_string(),
                reason: format!("all {} points are allocated", self.budget),
            });
        }
        if self.is_fully_invested(skill) {
            return Err(MechError::SkillRejected {
                skill: skill.to_string(),
                reason: format!("already at the maximum rank of {}", self.max_rank),
            });
        }
        *self.pending.entry(skill.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// Remove one pending point from `skill`.
    pub fn decrement(&mut self, skill: &str) -> MechResult<()> {
        let Some(points) = self.pending.get_mut(skill) else {
            return Err(MechError::SkillRejected {
                skill: skill.to_string(),
                reason: "no pending points to remove".to_string(),
            });
        };
        *points -= 1;
        if *points == 0 {
            self.pending.remove(skill);
        }
        Ok(())
    }

    /// Add `points` to `skill` one at a time, stopping at the first refusal.
    pub fn allocate(&mut self, skill: &str, points: u32) -> MechResult<()> {
        for _ in 0..points {
            self.increment(skill)?;
        }
        Ok(())
    }

    /// Why `Next` is disabled, if it is.
    pub fn incomplete_reason(&self) -> Option<String> {
        (self.allocated() != self.budget).then(|| {
            format!(
                "allocate exactly {} skill points ({} allocated)",
                self.budget,
                self.allocated()
            )
        })
    }

    /// Returns true once exactly the budget is allocated.
    pub fn is_complete(&self) -> bool {
        self.incomplete_reason().is_none()
    }
}
