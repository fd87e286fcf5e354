//! Hit point rolls with reroll-at-or-below-CON semantics.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Die;

/// The outcome of an automatic hit point roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointRoll {
    /// The die that was rolled.
    pub die: Die,
    /// Every draw in order, including rerolled ones. Empty when forced.
    pub rolls: Vec<u32>,
    /// The hit points gained.
    pub result: u32,
    /// True when the CON modifier reached the die size and no die was rolled.
    pub forced_max: bool,
}

impl HitPointRoll {
    /// Number of draws that were thrown away.
    pub fn rerolls(&self) -> usize {
        self.rolls.len().saturating_sub(1)
    }
}

impl std::fmt::Display for HitPointRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.forced_max {
            return write!(f, "{} (max {})", self.result, self.die);
        }
        let values: Vec<String> = self.rolls.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}] = {}", values.join(", "), self.result)
    }
}

/// Roll hit points on `die`, rerolling draws at or below `con_modifier`.
///
/// If the modifier is at least the die size the maximum is granted without
/// rolling. Otherwise draws repeat until one exceeds the modifier or shows the
/// top face; only the last draw counts.
pub fn roll_hit_points<R: Rng>(die: Die, con_modifier: i32, rng: &mut R) -> HitPointRoll {
    let sides = die.sides();
    if i64::from(con_modifier) >= i64::from(sides) {
        return HitPointRoll {
            die,
            rolls: Vec::new(),
            result: sides,
            forced_max: true,
        };
    }

    let mut rolls = Vec::new();
    loop {
        let value = rng.random_range(1..=sides);
        rolls.push(value);
        if i64::from(value) > i64::from(con_modifier) || value == sides {
            return HitPointRoll {
                die,
                rolls,
                result: value,
                forced_max: false,
            };
        }
    }
}
