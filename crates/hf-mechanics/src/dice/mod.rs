//! Dice types and dice expressions.
//!
//! Supports standard polyhedral dice (d4 through d100) and custom dice, plus
//! simple `NdM` expressions used for hit dice and initiative.

pub mod roll;

pub use roll::{HitPointRoll, roll_hit_points};

use serde::{Deserialize, Serialize};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// A die with a custom number of sides.
    Custom(u32),
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// Build a die from a side count, using the named variant when one exists.
    /// Returns `None` for fewer than two sides.
    pub fn with_sides(sides: u32) -> Option<Self> {
        match sides {
            0 | 1 => None,
            4 => Some(Self::D4),
            6 => Some(Self::D6),
            8 => Some(Self::D8),
            10 => Some(Self::D10),
            12 => Some(Self::D12),
            20 => Some(Self::D20),
            100 => Some(Self::D100),
            n => Some(Self::Custom(n)),
        }
    }

    /// Parse a class hit die of the form `1d<N>`.
    ///
    /// Anything else, including multi-die expressions, yields `None`.
    pub fn from_hit_die(s: &str) -> Option<Self> {
        let expr = DiceExpr::parse(s)?;
        (expr.count == 1).then_some(expr.die)
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A count of identical dice, such as `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceExpr {
    /// Number of dice rolled.
    pub count: u32,
    /// Die type.
    pub die: Die,
}

impl DiceExpr {
    /// Create an expression of `count` dice of type `die`.
    pub const fn new(count: u32, die: Die) -> Self {
        Self { count, die }
    }

    /// Parse `NdM`. The count must be at least one and the die at least two-sided.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let (count, sides) = s.split_once('d')?;
        let count = count.parse::<u32>().ok().filter(|c| *c >= 1)?;
        let die = Die::with_sides(sides.parse::<u32>().ok()?)?;
        Some(Self { count, die })
    }
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.count, self.die)
    }
}
