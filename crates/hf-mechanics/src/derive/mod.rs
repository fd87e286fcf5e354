//! Stat derivation: displayed combat and utility numbers from raw scores.
//!
//! Everything here is pure. Derived stats are recomputed from the current
//! attributes and the class row for the current level whenever they are
//! needed and are never stored.

pub mod initiative;

pub use initiative::{initiative_dice, initiative_formula};

use serde::Serialize;

use hf_core::{
    Attribute, AttributeSet, CharacterClass, CharacterSnapshot, ClassBaseAttributes,
    WillpowerProgression,
};

use crate::error::{MechError, MechResult};

/// The modifier for an ability score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Willpower gained from level alone under a progression mode.
pub fn willpower_gain(progression: WillpowerProgression, level: u32) -> i32 {
    let level = i32::try_from(level).unwrap_or(i32::MAX);
    match progression {
        WillpowerProgression::Even => level / 2,
        WillpowerProgression::Every => level,
        WillpowerProgression::None => 0,
    }
}

/// One modifier per attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityModifiers {
    /// STR modifier.
    pub strength: i32,
    /// CON modifier.
    pub constitution: i32,
    /// DEX modifier.
    pub dexterity: i32,
    /// INT modifier.
    pub intelligence: i32,
    /// WIS modifier.
    pub wisdom: i32,
    /// CHA modifier.
    pub charisma: i32,
}

impl AbilityModifiers {
    /// Compute all six modifiers.
    pub fn from_scores(scores: &AttributeSet) -> Self {
        Self {
            strength: ability_modifier(scores.strength),
            constitution: ability_modifier(scores.constitution),
            dexterity: ability_modifier(scores.dexterity),
            intelligence: ability_modifier(scores.intelligence),
            wisdom: ability_modifier(scores.wisdom),
            charisma: ability_modifier(scores.charisma),
        }
    }

    /// The modifier for one attribute.
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Constitution => self.constitution,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    fn best(&self, a: Attribute, b: Attribute) -> i32 {
        self.get(a).max(self.get(b))
    }
}

/// Attack numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffensiveStats {
    /// Attack bonus from the class table.
    pub attack: i32,
    /// Spell attack bonus from the class table.
    pub spell_attack: i32,
    /// Damage bonus from the class table.
    pub damage_bonus: String,
    /// Initiative dice formula from DEX.
    pub initiative: String,
}

/// Defense numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefensiveStats {
    /// Class AC plus the better of DEX and INT.
    pub armor_class: i32,
    /// Class fortitude plus the better of STR and CON.
    pub fortitude: i32,
    /// Class reflex plus the better of DEX and INT.
    pub reflex: i32,
    /// Class will plus the better of WIS and CHA.
    pub will: i32,
}

/// Everything else shown on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscStats {
    /// Level gain plus the better of WIS and CHA.
    pub willpower: i32,
    /// Leadership from the class table.
    pub leadership: i32,
    /// Skill ranks from the class table.
    pub skill_ranks: u32,
    /// Slayer bonus, if the class has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slayer: Option<String>,
    /// Rage, if the class has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rage: Option<String>,
    /// Brutal advantage, if the class has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brutal_advantage: Option<String>,
}

/// All derived stats for one character at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    /// Ability modifiers.
    pub modifiers: AbilityModifiers,
    /// Offensive stats.
    pub offense: OffensiveStats,
    /// Defensive stats.
    pub defense: DefensiveStats,
    /// Miscellaneous stats.
    pub misc: MiscStats,
}

/// Derive every displayed stat from level, scores, and the class row.
pub fn derive_stats(
    level: u32,
    scores: &AttributeSet,
    row: &ClassBaseAttributes,
    progression: WillpowerProgression,
) -> DerivedStats {
    let modifiers = AbilityModifiers::from_scores(scores);

    let offense = OffensiveStats {
        attack: row.attack,
        spell_attack: row.spell_attack,
        damage_bonus: row.damage_bonus.clone(),
        initiative: initiative_formula(modifiers.dexterity),
    };

    let defense = DefensiveStats {
        armor_class: row.armor_class
            + modifiers.best(Attribute::Dexterity, Attribute::Intelligence),
        fortitude: row.fortitude + modifiers.best(Attribute::Strength, Attribute::Constitution),
        reflex: row.reflex + modifiers.best(Attribute::Dexterity, Attribute::Intelligence),
        will: row.will + modifiers.best(Attribute::Wisdom, Attribute::Charisma),
    };

    let misc = MiscStats {
        willpower: willpower_gain(progression, level)
            + modifiers.best(Attribute::Wisdom, Attribute::Charisma),
        leadership: row.leadership,
        skill_ranks: row.skill_ranks,
        slayer: row.slayer.clone(),
        rage: row.rage.clone(),
        brutal_advantage: row.brutal_advantage.clone(),
    };

    DerivedStats {
        modifiers,
        offense,
        defense,
        misc,
    }
}

/// Derive stats for a stored character using its class row at its current level.
pub fn derive_for_character(
    character: &CharacterSnapshot,
    class: &CharacterClass,
) -> MechResult<DerivedStats> {
    let row = class
        .at_level(character.level)
        .ok_or_else(|| MechError::MissingClassRow {
            class: class.name.clone(),
            level: character.level,
        })?;
    Ok(derive_stats(
        character.level,
        &character.attributes,
        row,
        class.willpower,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fighter_row() -> ClassBaseAttributes {
        ClassBaseAttributes {
            level: 6,
            attack: 6,
            spell_attack: 1,
            armor_class: 14,
            fortitude: 5,
            reflex: 2,
            will: 2,
            damage_bonus: "+1d6".to_string(),
            leadership: 3,
            skill_ranks: 2,
            slayer: None,
            rage: Some("2/day".to_string()),
            brutal_advantage: None,
        }
    }

    fn scores() -> AttributeSet {
        AttributeSet {
            strength: 16,
            constitution: 14,
            dexterity: 12,
            intelligence: 8,
            wisdom: 14,
            charisma: 13,
        }
    }

    #[test]
    fn modifier_examples() {
        assert_eq!(ability_modifier(14), 2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn willpower_progressions() {
        // WIS +2, CHA +1
        let mods = AttributeSet {
            wisdom: 14,
            charisma: 12,
            ..AttributeSet::default()
        };
        let row = ClassBaseAttributes::default();
        let even = derive_stats(6, &mods, &row, WillpowerProgression::Even);
        let every = derive_stats(5, &mods, &row, WillpowerProgression::Every);
        let none = derive_stats(5, &mods, &row, WillpowerProgression::None);
        assert_eq!(even.misc.willpower, 5);
        assert_eq!(every.misc.willpower, 7);
        assert_eq!(none.misc.willpower, 2);
    }

    #[test]
    fn defenses_take_the_better_modifier() {
        let stats = derive_stats(6, &scores(), &fighter_row(), WillpowerProgression::Even);
        // DEX +1 beats INT -1
        assert_eq!(stats.defense.armor_class, 15);
        assert_eq!(stats.defense.reflex, 3);
        // STR +3 beats CON +2
        assert_eq!(stats.defense.fortitude, 8);
        // WIS +2 beats CHA +1
        assert_eq!(stats.defense.will, 4);
    }

    #[test]
    fn class_values_pass_through() {
        let stats = derive_stats(6, &scores(), &fighter_row(), WillpowerProgression::Even);
        assert_eq!(stats.offense.attack, 6);
        assert_eq!(stats.offense.spell_attack, 1);
        assert_eq!(stats.offense.damage_bonus, "+1d6");
        assert_eq!(stats.offense.initiative, "1d12+1");
        assert_eq!(stats.misc.leadership, 3);
        assert_eq!(stats.misc.skill_ranks, 2);
        assert_eq!(stats.misc.rage.as_deref(), Some("2/day"));
        assert!(stats.misc.slayer.is_none());
    }

    #[test]
    fn derive_for_character_requires_row() {
        let class = CharacterClass::new("Fighter").with_level(fighter_row());
        let at_six = CharacterSnapshot::new("Brenna", "Fighter")
            .with_level(6)
            .with_attributes(scores());
        assert!(derive_for_character(&at_six, &class).is_ok());

        let at_two = at_six.clone().with_level(2);
        assert!(matches!(
            derive_for_character(&at_two, &class),
            Err(MechError::MissingClassRow { level: 2, .. })
        ));
    }

    #[test]
    fn defense_line_snapshot() {
        let stats = derive_stats(6, &scores(), &fighter_row(), WillpowerProgression::Even);
        let d = stats.defense;
        let line = format!(
            "AC {} / Fort {} / Ref {} / Will {} / WP {}",
            d.armor_class, d.fortitude, d.reflex, d.will, stats.misc.willpower
        );
        insta::assert_snapshot!(line, @"AC 15 / Fort 8 / Ref 3 / Will 4 / WP 5");
    }

    proptest! {
        #[test]
        fn modifier_is_floor_of_half_distance(score in -20i32..=60) {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            prop_assert_eq!(ability_modifier(score), expected);
        }

        #[test]
        fn willpower_never_below_best_mental_modifier(
            level in 1u32..=20,
            wis in 1i32..=30,
            cha in 1i32..=30,
        ) {
            let scores = AttributeSet { wisdom: wis, charisma: cha, ..AttributeSet::default() };
            let row = ClassBaseAttributes::default();
            let best = ability_modifier(wis).max(ability_modifier(cha));
            for mode in [WillpowerProgression::Even, WillpowerProgression::Every, WillpowerProgression::None] {
                let stats = derive_stats(level, &scores, &row, mode);
                prop_assert!(stats.misc.willpower >= best);
            }
        }
    }
}
