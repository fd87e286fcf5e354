//! Attribute point allocation for a single level-up.
//!
//! Normal mode grants two points for two different attributes, one point each,
//! under a level-dependent cap. Advanced mode grants up to twenty points with
//! no per-attribute limit under a flat cap of 30.

use serde::{Deserialize, Serialize};

use hf_core::{Attribute, AttributeDelta, AttributeSet};

use crate::error::{MechError, MechResult};

/// Points spent per level in normal mode.
pub const NORMAL_POINTS: i32 = 2;
/// Distinct attributes that may be raised per level in normal mode.
pub const NORMAL_MAX_TOUCHED: usize = 2;
/// Point budget per level in advanced mode.
pub const ADVANCED_POINTS: i32 = 20;
/// Attribute cap in advanced mode.
pub const ADVANCED_CAP: i32 = 30;
/// Lowest legal attribute score.
pub const MIN_SCORE: i32 = 1;

/// The highest score an attribute may reach at `level` in normal mode.
pub fn attribute_cap(level: u32) -> i32 {
    match level {
        12.. => 24,
        8.. => 22,
        4.. => 20,
        _ => 18,
    }
}

/// The cap for a level under the given rule set.
pub fn cap_for_mode(level: u32, mode: AllocationMode) -> i32 {
    match mode {
        AllocationMode::Normal => attribute_cap(level),
        AllocationMode::Advanced => ADVANCED_CAP,
    }
}

/// Which allocation rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Two points, two attributes, level cap.
    #[default]
    Normal,
    /// Up to twenty points, flat cap of 30.
    Advanced,
}

impl AllocationMode {
    /// Build from the wire's `advancedMode` flag.
    pub fn from_flag(advanced: bool) -> Self {
        if advanced { Self::Advanced } else { Self::Normal }
    }

    /// Returns true for advanced mode.
    pub fn is_advanced(self) -> bool {
        self == Self::Advanced
    }

    /// Points that may be spent in this mode.
    pub fn budget(self) -> i32 {
        match self {
            Self::Normal => NORMAL_POINTS,
            Self::Advanced => ADVANCED_POINTS,
        }
    }
}

/// Pending attribute points on top of the pre-level-up scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAllocation {
    base: AttributeSet,
    target_level: u32,
    mode: AllocationMode,
    pending: AttributeDelta,
}

impl AttributeAllocation {
    /// Start an empty normal-mode allocation.
    pub fn new(base: AttributeSet, target_level: u32) -> Self {
        Self {
            base,
            target_level,
            mode: AllocationMode::Normal,
            pending: AttributeDelta::default(),
        }
    }

    /// Scores before this level-up.
    pub fn base(&self) -> &AttributeSet {
        &self.base
    }

    /// Points allocated so far.
    pub fn pending(&self) -> &AttributeDelta {
        &self.pending
    }

    /// Active rule set.
    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// The cap applying to every attribute right now.
    pub fn cap(&self) -> i32 {
        cap_for_mode(self.target_level, self.mode)
    }

    /// Points spent so far.
    pub fn spent(&self) -> i32 {
        self.pending.total()
    }

    /// Points still available.
    pub fn remaining(&self) -> i32 {
        self.mode.budget() - self.spent()
    }

    /// The score an attribute would have if committed now.
    pub fn value(&self, attribute: Attribute) -> i32 {
        self.base.get(attribute) + self.pending.get(attribute)
    }

    /// All scores as they would be if committed now.
    pub fn resulting(&self) -> AttributeSet {
        self.base.apply(&self.pending)
    }

    /// Switch rule sets. Any change of mode discards pending points.
    pub fn set_mode(&mut self, mode: AllocationMode) {
        if self.mode != mode {
            self.mode = mode;
            self.pending = AttributeDelta::default();
        }
    }

    /// Why a point cannot be added to `attribute`, if it cannot.
    pub fn increment_blocker(&self, attribute: Attribute) -> Option<String> {
        let next = self.value(attribute) + 1;
        if self.remaining() < 1 {
            return Some(format!("all {} points are spent", self.mode.budget()));
        }
        if next > self.cap() {
            return Some(format!("{next} would exceed the cap of {}", self.cap()));
        }
        if self.mode == AllocationMode::Normal {
            if self.pending.get(attribute) != 0 {
                return Some("already raised this level".to_string());
            }
            if self.pending.touched() >= NORMAL_MAX_TOUCHED {
                return Some(format!(
                    "{NORMAL_MAX_TOUCHED} attributes are already raised"
                ));
            }
        }
        None
    }

    /// Why a point cannot be removed from `attribute`, if it cannot.
    pub fn decrement_blocker(&self, attribute: Attribute) -> Option<String> {
        if self.pending.get(attribute) <= 0 {
            return Some(format!(
                "already at its pre-level-up value of {}",
                self.base.get(attribute)
            ));
        }
        if self.value(attribute) - 1 < MIN_SCORE {
            return Some(format!("cannot go below {MIN_SCORE}"));
        }
        None
    }

    /// Returns true if `increment` would succeed.
    pub fn can_increment(&self, attribute: Attribute) -> bool {
        self.increment_blocker(attribute).is_none()
    }

    /// Returns true if `decrement` would succeed.
    pub fn can_decrement(&self, attribute: Attribute) -> bool {
        self.decrement_blocker(attribute).is_none()
    }

    /// Add one point to `attribute`.
    pub fn increment(&mut self, attribute: Attribute) -> MechResult<()> {
        if let Some(reason) = self.increment_blocker(attribute) {
            return Err(MechError::IllegalIncrement { attribute, reason });
        }
        self.pending.add(attribute, 1);
        Ok(())
    }

    /// Remove one pending point from `attribute`.
    pub fn decrement(&mut self, attribute: Attribute) -> MechResult<()> {
        if let Some(reason) = self.decrement_blocker(attribute) {
            return Err(MechError::IllegalDecrement { attribute, reason });
        }
        self.pending.add(attribute, -1);
        Ok(())
    }

    /// Why `Next` is disabled, if it is.
    pub fn incomplete_reason(&self) -> Option<String> {
        match self.mode {
            AllocationMode::Normal if self.spent() != NORMAL_POINTS => Some(format!(
                "spend exactly {NORMAL_POINTS} points ({} spent)",
                self.spent()
            )),
            AllocationMode::Advanced if self.spent() < 1 => {
                Some("spend at least 1 point".to_string())
            }
            _ => None,
        }
    }

    /// Returns true once `Next` is enabled.
    pub fn is_complete(&self) -> bool {
        self.incomplete_reason().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alloc(level: u32) -> AttributeAllocation {
        AttributeAllocation::new(AttributeSet::uniform(14), level)
    }

    #[test]
    fn cap_by_level() {
        assert_eq!(attribute_cap(1), 18);
        assert_eq!(attribute_cap(3), 18);
        assert_eq!(attribute_cap(4), 20);
        assert_eq!(attribute_cap(7), 20);
        assert_eq!(attribute_cap(8), 22);
        assert_eq!(attribute_cap(11), 22);
        assert_eq!(attribute_cap(12), 24);
        assert_eq!(attribute_cap(20), 24);
        assert_eq!(cap_for_mode(2, AllocationMode::Advanced), 30);
    }

    #[test]
    fn normal_two_distinct_points() {
        let mut a = alloc(2);
        a.increment(Attribute::Strength).unwrap();
        assert!(!a.is_complete());
        assert!(matches!(
            a.increment(Attribute::Strength),
            Err(MechError::IllegalIncrement { .. })
        ));
        a.increment(Attribute::Constitution).unwrap();
        assert!(a.is_complete());
        assert!(!a.can_increment(Attribute::Dexterity));
        assert_eq!(a.resulting().strength, 15);
        assert_eq!(a.resulting().constitution, 15);
    }

    #[test]
    fn normal_decrement_only_pending() {
        let mut a = alloc(2);
        assert!(a.decrement(Attribute::Wisdom).is_err());
        a.increment(Attribute::Wisdom).unwrap();
        a.decrement(Attribute::Wisdom).unwrap();
        assert_eq!(a.spent(), 0);
        assert_eq!(a.value(Attribute::Wisdom), 14);
    }

    #[test]
    fn normal_respects_level_cap() {
        let mut base = AttributeSet::uniform(10);
        base.strength = 18;
        let mut a = AttributeAllocation::new(base, 3);
        assert!(!a.can_increment(Attribute::Strength));
        assert!(a.increment(Attribute::Strength).is_err());

        let mut a = AttributeAllocation::new(base, 4);
        a.increment(Attribute::Strength).unwrap();
        assert_eq!(a.value(Attribute::Strength), 19);
    }

    #[test]
    fn advanced_allows_stacking_up_to_budget() {
        let mut a = alloc(2);
        a.set_mode(AllocationMode::Advanced);
        for _ in 0..16 {
            a.increment(Attribute::Strength).unwrap();
        }
        assert_eq!(a.value(Attribute::Strength), 30);
        assert!(a.increment(Attribute::Strength).is_err());
        for _ in 0..4 {
            a.increment(Attribute::Dexterity).unwrap();
        }
        assert_eq!(a.remaining(), 0);
        assert!(a.increment(Attribute::Charisma).is_err());
        assert!(a.is_complete());
    }

    #[test]
    fn advanced_complete_after_one_point() {
        let mut a = alloc(2);
        a.set_mode(AllocationMode::Advanced);
        assert!(!a.is_complete());
        a.increment(Attribute::Intelligence).unwrap();
        assert!(a.is_complete());
    }

    #[test]
    fn advanced_decrement_stops_at_base() {
        let mut a = alloc(2);
        a.set_mode(AllocationMode::Advanced);
        a.increment(Attribute::Charisma).unwrap();
        a.decrement(Attribute::Charisma).unwrap();
        assert!(a.decrement(Attribute::Charisma).is_err());
    }

    #[test]
    fn switching_mode_resets_pending() {
        let mut a = alloc(2);
        a.increment(Attribute::Strength).unwrap();
        a.set_mode(AllocationMode::Advanced);
        assert_eq!(a.spent(), 0);
        a.increment(Attribute::Strength).unwrap();
        a.set_mode(AllocationMode::Advanced);
        assert_eq!(a.spent(), 1);
        a.set_mode(AllocationMode::Normal);
        assert_eq!(a.spent(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Inc(usize),
        Dec(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0usize..6).prop_map(Op::Inc), (0usize..6).prop_map(Op::Dec)]
    }

    proptest! {
        #[test]
        fn cap_is_monotonic(a in 0u32..40, b in 0u32..40) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(attribute_cap(lo) <= attribute_cap(hi));
        }

        #[test]
        fn normal_mode_never_exceeds_its_rules(
            base in 8i32..=18,
            level in 2u32..=20,
            ops in proptest::collection::vec(op(), 0..30),
        ) {
            let mut a = AttributeAllocation::new(AttributeSet::uniform(base), level);
            for op in ops {
                let _ = match op {
                    Op::Inc(i) => a.increment(Attribute::ALL[i]),
                    Op::Dec(i) => a.decrement(Attribute::ALL[i]),
                };
                prop_assert!(a.spent() <= NORMAL_POINTS);
                prop_assert!(a.pending().touched() <= NORMAL_MAX_TOUCHED);
                for attribute in Attribute::ALL {
                    let p = a.pending().get(attribute);
                    prop_assert!((0..=1).contains(&p));
                    if p > 0 {
                        prop_assert!(a.value(attribute) <= attribute_cap(level));
                    }
                }
            }
        }

        #[test]
        fn advanced_mode_stays_in_bounds(
            base in 1i32..=30,
            ops in proptest::collection::vec(op(), 0..60),
        ) {
            let mut a = AttributeAllocation::new(AttributeSet::uniform(base), 5);
            a.set_mode(AllocationMode::Advanced);
            for op in ops {
                let _ = match op {
                    Op::Inc(i) => a.increment(Attribute::ALL[i]),
                    Op::Dec(i) => a.decrement(Attribute::ALL[i]),
                };
                prop_assert!((0..=ADVANCED_POINTS).contains(&a.spent()));
                for attribute in Attribute::ALL {
                    prop_assert!(a.pending().get(attribute) >= 0);
                    prop_assert!((MIN_SCORE..=ADVANCED_CAP).contains(&a.value(attribute)));
                }
            }
        }
    }
}
