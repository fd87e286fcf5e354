//! Experience thresholds and the level they imply.

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Highest level in the default table.
pub const DEFAULT_MAX_LEVEL: u32 = 20;

/// Experience needed for each level above 1.
///
/// `thresholds[0]` is the total for level 2, `thresholds[1]` for level 3, and
/// so on. The default table needs `500 * L * (L - 1)` XP for level `L`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceTable {
    thresholds: Vec<u64>,
}

impl Default for ExperienceTable {
    fn default() -> Self {
        let thresholds = (2..=u64::from(DEFAULT_MAX_LEVEL))
            .map(|level| 500 * level * (level - 1))
            .collect();
        Self { thresholds }
    }
}

impl ExperienceTable {
    /// Build a custom table. Thresholds must be non-empty and strictly increasing.
    pub fn from_thresholds(thresholds: Vec<u64>) -> MechResult<Self> {
        if thresholds.is_empty() {
            return Err(MechError::InvalidConfig(
                "experience table needs at least one threshold".to_string(),
            ));
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[1] <= w[0]) {
            return Err(MechError::InvalidConfig(format!(
                "experience thresholds must increase ({} then {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { thresholds })
    }

    /// The highest reachable level.
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.thresholds.len()).map_or(u32::MAX, |n| n + 1)
    }

    /// XP total required for `level`. Level 1 needs nothing.
    pub fn threshold(&self, level: u32) -> Option<u64> {
        match level {
            0 => None,
            1 => Some(0),
            _ => self.thresholds.get(level as usize - 2).copied(),
        }
    }

    /// The level an XP total qualifies for.
    pub fn level_for(&self, experience: u64) -> u32 {
        let reached = self.thresholds.iter().take_while(|&&t| t <= experience).count();
        u32::try_from(reached).map_or(u32::MAX, |n| n + 1)
    }

    /// XP still needed to reach the level after `level`, if there is one.
    pub fn to_next_level(&self, level: u32, experience: u64) -> Option<u64> {
        self.threshold(level + 1)
            .map(|needed| needed.saturating_sub(experience))
    }

    /// The raw thresholds, starting with level 2.
    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_thresholds() {
        let table = ExperienceTable::default();
        assert_eq!(table.threshold(1), Some(0));
        assert_eq!(table.threshold(2), Some(1_000));
        assert_eq!(table.threshold(3), Some(3_000));
        assert_eq!(table.threshold(4), Some(6_000));
        assert_eq!(table.threshold(20), Some(190_000));
        assert_eq!(table.threshold(21), None);
        assert_eq!(table.max_level(), 20);
    }

    #[test]
    fn level_for_experience() {
        let table = ExperienceTable::default();
        assert_eq!(table.level_for(0), 1);
        assert_eq!(table.level_for(999), 1);
        assert_eq!(table.level_for(1_000), 2);
        assert_eq!(table.level_for(6_500), 4);
        assert_eq!(table.level_for(10_000_000), 20);
    }

    #[test]
    fn to_next_level() {
        let table = ExperienceTable::default();
        assert_eq!(table.to_next_level(2, 2_500), Some(500));
        assert_eq!(table.to_next_level(20, 500_000), None);
    }

    #[test]
    fn custom_tables_validated() {
        assert!(ExperienceTable::from_thresholds(vec![]).is_err());
        assert!(ExperienceTable::from_thresholds(vec![100, 100]).is_err());
        let table = ExperienceTable::from_thresholds(vec![10, 30, 60]).unwrap();
        assert_eq!(table.max_level(), 4);
        assert_eq!(table.level_for(35), 3);
    }

    proptest! {
        #[test]
        fn level_for_is_monotonic(a in 0u64..400_000, b in 0u64..400_000) {
            let table = ExperienceTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.level_for(lo) <= table.level_for(hi));
        }

        #[test]
        fn level_threshold_is_reached(xp in 0u64..400_000) {
            let table = ExperienceTable::default();
            let level = table.level_for(xp);
            prop_assert!(table.threshold(level).unwrap() <= xp);
        }
    }
}
