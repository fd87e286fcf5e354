//! Hit point gain for a single level-up.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dice::{Die, HitPointRoll, roll_hit_points};
use crate::error::{MechError, MechResult};
use crate::levelup::attributes::AllocationMode;

/// Highest manual gain accepted in advanced mode.
pub const ADVANCED_HP_MAX: u32 = 50;
/// Die used when a class has no usable hit die.
pub const DEFAULT_HIT_DIE: Die = Die::D6;

/// Where a hit point gain came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitPointSource {
    /// Automatic roll, with its full history.
    Rolled(HitPointRoll),
    /// Typed in by the player.
    Manual {
        /// The value is at or below the CON modifier and should have been rerolled.
        reroll_warning: bool,
    },
}

/// A hit point gain that has been set for this level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointGain {
    /// Hit points gained.
    pub value: u32,
    /// How the value was obtained.
    pub source: HitPointSource,
}

impl HitPointGain {
    /// Returns true for a manual value that the reroll rule would have discarded.
    pub fn should_have_rerolled(&self) -> bool {
        matches!(
            self.source,
            HitPointSource::Manual {
                reroll_warning: true
            }
        )
    }
}

/// The hit point input for one level-up: unset until rolled or entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitPointEntry {
    die: Die,
    con_modifier: i32,
    mode: AllocationMode,
    gain: Option<HitPointGain>,
}

impl HitPointEntry {
    /// Start with no value set.
    pub fn new(die: Die, con_modifier: i32, mode: AllocationMode) -> Self {
        Self {
            die,
            con_modifier,
            mode,
            gain: None,
        }
    }

    /// The class hit die.
    pub fn die(&self) -> Die {
        self.die
    }

    /// CON modifier including this level's pending CON points.
    pub fn con_modifier(&self) -> i32 {
        self.con_modifier
    }

    /// The gain, once set.
    pub fn gain(&self) -> Option<&HitPointGain> {
        self.gain.as_ref()
    }

    /// Inclusive range accepted for manual entry.
    pub fn range(&self) -> (u32, u32) {
        match self.mode {
            AllocationMode::Normal => (1, self.die.sides()),
            AllocationMode::Advanced => (1, ADVANCED_HP_MAX),
        }
    }

    /// Returns true if `value` is one the reroll rule would not let stand.
    pub fn needs_reroll(&self, value: u32) -> bool {
        self.mode == AllocationMode::Normal
            && self.con_modifier < i32::try_from(self.die.sides()).unwrap_or(i32::MAX)
            && i64::from(value) <= i64::from(self.con_modifier)
    }

    /// Roll the hit die. Only available in normal mode with no value set.
    pub fn roll<R: Rng>(&mut self, rng: &mut R) -> MechResult<&HitPointGain> {
        if self.mode.is_advanced() {
            return Err(MechError::RollUnavailable);
        }
        self.ensure_unset()?;
        let roll = roll_hit_points(self.die, self.con_modifier, rng);
        tracing::debug!(die = %self.die, con_modifier = self.con_modifier, %roll, "rolled hit points");
        Ok(self.gain.insert(HitPointGain {
            value: roll.result,
            source: HitPointSource::Rolled(roll),
        }))
    }

    /// Enter a value by hand.
    ///
    /// Values the reroll rule would discard are accepted with a warning flag.
    pub fn enter(&mut self, value: i64) -> MechResult<&HitPointGain> {
        self.ensure_unset()?;
        let (min, max) = self.range();
        let accepted = u32::try_from(value)
            .ok()
            .filter(|v| (min..=max).contains(v))
            .ok_or(MechError::HitPointsOutOfRange { value, min, max })?;
        let reroll_warning = self.needs_reroll(accepted);
        if reroll_warning {
            tracing::warn!(
                value = accepted,
                con_modifier = self.con_modifier,
                "manual hit points at or below CON modifier"
            );
        }
        Ok(self.gain.insert(HitPointGain {
            value: accepted,
            source: HitPointSource::Manual { reroll_warning },
        }))
    }

    /// Clear the value and return to the unset input.
    pub fn change(&mut self) {
        self.gain = None;
    }

    /// Why `Next` is disabled, if it is.
    pub fn incomplete_reason(&self) -> Option<String> {
        match &self.gain {
            Some(gain) if gain.value > 0 => None,
            _ => Some("roll or enter hit points".to_string()),
        }
    }

    /// Returns true once a non-zero gain is set.
    pub fn is_complete(&self) -> bool {
        self.incomplete_reason().is_none()
    }

    fn ensure_unset(&self) -> MechResult<()> {
        match &self.gain {
            Some(gain) => Err(MechError::HitPointsAlreadySet(gain.value)),
            None => Ok(()),
        }
    }
}
