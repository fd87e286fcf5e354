//! Initiative dice by DEX modifier.

use crate::dice::{DiceExpr, Die};

/// Lowest modifier the table covers.
pub const MIN_MODIFIER: i32 = -4;
/// Highest modifier the table covers.
pub const MAX_MODIFIER: i32 = 10;

const TABLE: [(i32, DiceExpr); 15] = [
    (-4, DiceExpr::new(1, Die::D4)),
    (-3, DiceExpr::new(1, Die::D6)),
    (-2, DiceExpr::new(1, Die::D8)),
    (-1, DiceExpr::new(2, Die::D4)),
    (0, DiceExpr::new(1, Die::D10)),
    (1, DiceExpr::new(1, Die::D12)),
    (2, DiceExpr::new(2, Die::D6)),
    (3, DiceExpr::new(2, Die::D8)),
    (4, DiceExpr::new(3, Die::D6)),
    (5, DiceExpr::new(2, Die::D10)),
    (6, DiceExpr::new(2, Die::D12)),
    (7, DiceExpr::new(3, Die::D8)),
    (8, DiceExpr::new(4, Die::D6)),
    (9, DiceExpr::new(3, Die::D10)),
    (10, DiceExpr::new(4, Die::D8)),
];

/// The initiative dice for a modifier, clamped into the table's range.
pub fn initiative_dice(modifier: i32) -> Option<DiceExpr> {
    let key = modifier.clamp(MIN_MODIFIER, MAX_MODIFIER);
    TABLE
        .iter()
        .find(|(m, _)| *m == key)
        .map(|(_, dice)| *dice)
}

/// Render the initiative formula for a DEX modifier.
///
/// The table dice carry the real modifier with an explicit sign and a zero
/// modifier is omitted (`1d10`). Without a table entry the formula falls back
/// to a d20 and always shows the sign (`1d20+0`).
pub fn initiative_formula(modifier: i32) -> String {
    match initiative_dice(modifier) {
        Some(dice) if modifier == 0 => dice.to_string(),
        Some(dice) => format!("{dice}{modifier:+}"),
        None => format!("1d20{modifier:+}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors() {
        assert_eq!(initiative_dice(-4).map(|d| d.to_string()).as_deref(), Some("1d4"));
        assert_eq!(initiative_dice(0).map(|d| d.to_string()).as_deref(), Some("1d10"));
        assert_eq!(initiative_dice(10).map(|d| d.to_string()).as_deref(), Some("4d8"));
    }

    #[test]
    fn every_modifier_in_range_has_an_entry() {
        for m in MIN_MODIFIER..=MAX_MODIFIER {
            assert!(initiative_dice(m).is_some(), "missing entry for {m}");
        }
    }

    #[test]
    fn clamps_out_of_range_modifiers() {
        assert_eq!(initiative_dice(-9), initiative_dice(-4));
        assert_eq!(initiative_dice(15), initiative_dice(10));
    }

    #[test]
    fn expected_value_never_decreases() {
        let averages: Vec<u32> = (MIN_MODIFIER..=MAX_MODIFIER)
            .filter_map(initiative_dice)
            .map(|d| d.count * (d.die.sides() + 1))
            .collect();
        assert!(averages.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn formula_rendering() {
        assert_eq!(initiative_formula(0), "1d10");
        assert_eq!(initiative_formula(2), "2d6+2");
        assert_eq!(initiative_formula(-1), "2d4-1");
        assert_eq!(initiative_formula(-5), "1d4-5");
        assert_eq!(initiative_formula(12), "4d8+12");
    }
}
