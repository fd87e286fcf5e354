//! Consistency checks across a campaign.
//!
//! Checks that class tables are usable for level-ups and that every
//! character's stored numbers are ones the level-up rules could have
//! produced.

use std::collections::BTreeSet;

use hf_core::{Campaign, CharacterClass, CharacterSnapshot};

use crate::config::ProgressionConfig;
use crate::dice::Die;
use crate::levelup::attributes::{ADVANCED_CAP, MIN_SCORE, attribute_cap};

/// A warning or error found during campaign validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// The class or character where the issue was found.
    pub entity: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.entity, self.message)
    }
}

/// Validate every class and character in a campaign.
///
/// An invalid experience table in the settings is reported once and the
/// default table is used for the remaining checks.
pub fn validate_campaign(campaign: &Campaign) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let config = match ProgressionConfig::from_settings(&campaign.settings) {
        Ok(config) => config,
        Err(e) => {
            issues.push(ValidationIssue {
                entity: "settings".to_string(),
                message: e.to_string(),
                is_error: true,
            });
            ProgressionConfig::default()
        }
    };

    for class in campaign.classes() {
        validate_class(class, &mut issues);
    }

    for character in campaign.characters() {
        let class = campaign.find_class(&character.class);
        validate_character(character, class, &config, &mut issues);
    }

    issues
}

/// Validate a class table.
fn validate_class(class: &CharacterClass, issues: &mut Vec<ValidationIssue>) {
    let entity = format!("class '{}'", class.name);

    if class.levels.is_empty() {
        issues.push(ValidationIssue {
            entity: entity.clone(),
            message: "no level rows defined".to_string(),
            is_error: true,
        });
    }

    let mut seen = BTreeSet::new();
    for row in &class.levels {
        if !seen.insert(row.level) {
            issues.push(ValidationIssue {
                entity: entity.clone(),
                message: format!("level {} is defined more than once", row.level),
                is_error: true,
            });
        }
    }

    match class.hit_die.as_deref() {
        None => issues.push(ValidationIssue {
            entity,
            message: "no hit die, level-ups will roll d6".to_string(),
            is_error: false,
        }),
        Some(hit_die) if Die::from_hit_die(hit_die).is_none() => issues.push(ValidationIssue {
            entity,
            message: format!("hit die '{hit_die}' is not of the form 1dN, level-ups will roll d6"),
            is_error: false,
        }),
        Some(_) => {}
    }
}

/// Validate a character against its class and the experience table.
fn validate_character(
    character: &CharacterSnapshot,
    class: Option<&CharacterClass>,
    config: &ProgressionConfig,
    issues: &mut Vec<ValidationIssue>,
) {
    let entity = format!("character '{}'", character.name);

    match class {
        None => issues.push(ValidationIssue {
            entity: entity.clone(),
            message: format!("unknown class '{}'", character.class),
            is_error: true,
        }),
        Some(class) if class.at_level(character.level).is_none() => {
            issues.push(ValidationIssue {
                entity: entity.clone(),
                message: format!(
                    "class '{}' has no row for level {}",
                    class.name, character.level
                ),
                is_error: true,
            });
        }
        Some(_) => {}
    }

    if character.level == 0 {
        issues.push(ValidationIssue {
            entity: entity.clone(),
            message: "level must be at least 1".to_string(),
            is_error: true,
        });
    }

    let cap = attribute_cap(character.level);
    for (attribute, score) in character.attributes.iter() {
        if !(MIN_SCORE..=ADVANCED_CAP).contains(&score) {
            issues.push(ValidationIssue {
                entity: entity.clone(),
                message: format!("{attribute} {score} is outside {MIN_SCORE}..={ADVANCED_CAP}"),
                is_error: true,
            });
        } else if score > cap {
            issues.push(ValidationIssue {
                entity: entity.clone(),
                message: format!(
                    "{attribute} {score} is above the level {} cap of {cap}",
                    character.level
                ),
                is_error: false,
            });
        }
    }

    if character.current_hp > character.max_hp {
        issues.push(ValidationIssue {
            entity: entity.clone(),
            message: format!(
                "current HP {} exceeds max HP {}",
                character.current_hp, character.max_hp
            ),
            is_error: true,
        });
    }

    let next_level = character.level.saturating_add(1);
    if let Some(row) = class.and_then(|c| c.at_level(next_level)) {
        let capacity: u32 = character
            .skills
            .values()
            .map(|points| next_level.saturating_sub(*points))
            .fold(0, u32::saturating_add);
        if row.skill_ranks > capacity {
            issues.push(ValidationIssue {
                entity: entity.clone(),
                message: format!(
                    "level {next_level} grants {} skill points but its skills can take only {capacity}, the skill step cannot be completed",
                    row.skill_ranks
                ),
                is_error: false,
            });
        }
    }

    let earned = config.experience.level_for(character.experience);
    if earned > character.level {
        issues.push(ValidationIssue {
            entity,
            message: format!(
                "{} XP qualifies for level {earned}, level-up pending",
                character.experience
            ),
            is_error: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::{AttributeSet, CampaignMeta, ClassBaseAttributes};

    fn row(level: u32) -> ClassBaseAttributes {
        ClassBaseAttributes {
            level,
            ..ClassBaseAttributes::default()
        }
    }

    fn campaign_with(class: CharacterClass, character: CharacterSnapshot) -> Campaign {
        let mut campaign = Campaign::new(CampaignMeta::new("Test"));
        campaign.add_class(class).unwrap();
        campaign.add_character(character).unwrap();
        campaign
    }

    fn fighter() -> CharacterClass {
        CharacterClass::new("Fighter")
            .with_hit_die("1d10")
            .with_level(row(1))
            .with_level(row(2))
    }

    #[test]
    fn clean_campaign_has_no_issues() {
        let campaign = campaign_with(
            fighter(),
            CharacterSnapshot::new("Brenna", "Fighter").with_hp(10),
        );
        assert!(validate_campaign(&campaign).is_empty());
    }

    #[test]
    fn class_problems() {
        let class = CharacterClass::new("Odd")
            .with_hit_die("d8+2")
            .with_level(row(1))
            .with_level(row(1));
        let campaign = campaign_with(class, CharacterSnapshot::new("Orla", "Odd"));
        let issues = validate_campaign(&campaign);
        assert!(issues
            .iter()
            .any(|i| i.is_error && i.message.contains("more than once")));
        assert!(issues
            .iter()
            .any(|i| !i.is_error && i.message.contains("d8+2")));
    }

    #[test]
    fn empty_class_is_an_error() {
        let campaign = campaign_with(
            CharacterClass::new("Empty"),
            CharacterSnapshot::new("Orla", "Fighter"),
        );
        let issues = validate_campaign(&campaign);
        assert!(issues.iter().any(|i| i.message == "no level rows defined"));
        assert!(issues
            .iter()
            .any(|i| i.message.contains("unknown class 'Fighter'")));
    }

    #[test]
    fn character_problems() {
        let mut scores = AttributeSet::uniform(10);
        scores.strength = 19;
        scores.charisma = 0;
        let mut character = CharacterSnapshot::new("Brenna", "Fighter")
            .with_level(2)
            .with_attributes(scores)
            .with_hp(10)
            .with_experience(3_500);
        character.current_hp = 12;
        let campaign = campaign_with(fighter(), character);
        let issues = validate_campaign(&campaign);

        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert!(messages.contains(&"warning: character 'Brenna': STR 19 is above the level 2 cap of 18".to_string()));
        assert!(messages.contains(&"error: character 'Brenna': CHA 0 is outside 1..=30".to_string()));
        assert!(messages.contains(&"error: character 'Brenna': current HP 12 exceeds max HP 10".to_string()));
        assert!(messages.contains(&"warning: character 'Brenna': 3500 XP qualifies for level 3, level-up pending".to_string()));
    }

    #[test]
    fn unspendable_skill_budget_is_flagged() {
        let class = CharacterClass::new("Fighter")
            .with_hit_die("1d10")
            .with_level(row(1))
            .with_level(ClassBaseAttributes {
                level: 2,
                skill_ranks: 3,
                ..ClassBaseAttributes::default()
            });
        let character = CharacterSnapshot::new("Brenna", "Fighter")
            .with_hp(10)
            .with_skill("Climb", 1)
            .with_skill("Swim", 0);
        assert!(validate_campaign(&campaign_with(class.clone(), character)).is_empty());

        let tight = CharacterSnapshot::new("Orla", "Fighter")
            .with_hp(10)
            .with_skill("Climb", 2)
            .with_skill("Swim", 1);
        let issues = validate_campaign(&campaign_with(class, tight));
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error);
        assert!(issues[0]
            .message
            .contains("level 2 grants 3 skill points but its skills can take only 1"));
    }

    #[test]
    fn level_beyond_table() {
        let campaign = campaign_with(
            fighter(),
            CharacterSnapshot::new("Brenna", "Fighter").with_level(5).with_hp(30).with_experience(10_000),
        );
        let issues = validate_campaign(&campaign);
        assert!(issues
            .iter()
            .any(|i| i.is_error && i.message.contains("no row for level 5")));
    }

    #[test]
    fn bad_experience_settings_reported() {
        let mut campaign = campaign_with(
            fighter(),
            CharacterSnapshot::new("Brenna", "Fighter").with_hp(10),
        );
        campaign.settings.experience_thresholds = vec![10, 5];
        let issues = validate_campaign(&campaign);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entity, "settings");
        assert!(issues[0].is_error);
    }

    #[test]
    fn issue_display() {
        let issue = ValidationIssue {
            entity: "class 'Fighter'".to_string(),
            message: "no level rows defined".to_string(),
            is_error: true,
        };
        assert_eq!(issue.to_string(), "error: class 'Fighter': no level rows defined");
    }
}
