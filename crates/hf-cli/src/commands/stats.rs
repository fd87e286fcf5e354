use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use hf_core::Attribute;
use hf_mechanics::{ProgressionConfig, derive_for_character};

fn signed(value: i32) -> String {
    format!("{value:+}")
}

pub fn run(file: &Path, name: &str) -> Result<(), String> {
    let campaign = super::load_campaign(file)?;
    let (character, class) = super::character_and_class(&campaign, name)?;
    let stats = derive_for_character(character, class).map_err(|e| e.to_string())?;
    let config = ProgressionConfig::from_settings(&campaign.settings).map_err(|e| e.to_string())?;

    // Header
    let heading = format!("{} level {}", class.name, character.level);
    println!("  {} [{}]", character.name.bold(), heading.dimmed());
    println!("  HP {}/{}", character.current_hp, character.max_hp);
    match config
        .experience
        .to_next_level(character.level, character.experience)
    {
        Some(needed) => println!("  XP {} ({} to next level)", character.experience, needed),
        None => println!("  XP {} (max level)", character.experience),
    }
    println!();

    let mut scores = Table::new();
    scores.set_content_arrangement(ContentArrangement::Dynamic);
    scores.set_header(vec!["Attribute", "Score", "Modifier"]);
    for attribute in Attribute::ALL {
        scores.add_row(vec![
            attribute.to_string(),
            character.attributes.get(attribute).to_string(),
            signed(stats.modifiers.get(attribute)),
        ]);
    }
    println!("{scores}");
    println!();

    let mut derived = Table::new();
    derived.set_content_arrangement(ContentArrangement::Dynamic);
    derived.set_header(vec!["Stat", "Value"]);
    let offense = &stats.offense;
    let defense = &stats.defense;
    let misc = &stats.misc;
    let mut rows = vec![
        ("Attack", signed(offense.attack)),
        ("Spell attack", signed(offense.spell_attack)),
        ("Damage bonus", offense.damage_bonus.clone()),
        ("Initiative", offense.initiative.clone()),
        ("Armor class", defense.armor_class.to_string()),
        ("Fortitude", signed(defense.fortitude)),
        ("Reflex", signed(defense.reflex)),
        ("Will", signed(defense.will)),
        ("Willpower", misc.willpower.to_string()),
        ("Leadership", misc.leadership.to_string()),
        ("Skill ranks", misc.skill_ranks.to_string()),
    ];
    for (label, value) in [
        ("Slayer", &misc.slayer),
        ("Rage", &misc.rage),
        ("Brutal advantage", &misc.brutal_advantage),
    ] {
        if let Some(value) = value {
            rows.push((label, value.clone()));
        }
    }
    for (label, value) in rows {
        derived.add_row(vec![label.to_string(), value]);
    }
    println!("{derived}");

    if !character.skills.is_empty() {
        println!();
        let mut skills = Table::new();
        skills.set_content_arrangement(ContentArrangement::Dynamic);
        skills.set_header(vec!["Skill", "Points"]);
        for (skill, points) in &character.skills {
            skills.add_row(vec![skill.clone(), points.to_string()]);
        }
        println!("{skills}");
    }

    Ok(())
}
