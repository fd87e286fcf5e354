use std::fs;
use std::path::Path;

use hf_core::{
    AttributeSet, Campaign, CampaignMeta, CharacterClass, CharacterSnapshot, ClassBaseAttributes,
    WillpowerProgression,
};

/// A twenty-level fighter table to start from.
fn sample_class() -> CharacterClass {
    let mut class = CharacterClass::new("Fighter")
        .with_hit_die("1d10")
        .with_willpower(WillpowerProgression::Even);
    for level in 1..=20u32 {
        let l = i32::try_from(level).unwrap_or(i32::MAX);
        class = class.with_level(ClassBaseAttributes {
            level,
            attack: l,
            spell_attack: l / 3,
            armor_class: 12 + l / 2,
            fortitude: 2 + l / 2,
            reflex: l / 3,
            will: l / 3,
            damage_bonus: format!("+{}", (l + 3) / 4),
            leadership: l / 2,
            skill_ranks: 2,
            slayer: (level >= 10).then(|| format!("+{}", l / 5)),
            rage: None,
            brutal_advantage: None,
        });
    }
    class
}

fn sample_character() -> CharacterSnapshot {
    CharacterSnapshot::new("Aldric", "Fighter")
        .with_owner("player")
        .with_attributes(AttributeSet {
            strength: 16,
            constitution: 14,
            dexterity: 12,
            intelligence: 10,
            wisdom: 13,
            charisma: 8,
        })
        .with_hp(12)
        .with_skill("Athletics", 1)
        .with_skill("Perception", 0)
        .with_skill("Survival", 0)
}

pub fn run(name: &str) -> Result<(), String> {
    let dir = Path::new(name);

    if dir.exists() {
        return Err(format!("directory '{}' already exists", name));
    }

    let mut campaign = Campaign::new(CampaignMeta::new(name));
    campaign
        .add_class(sample_class())
        .map_err(|e| e.to_string())?;
    campaign
        .add_character(sample_character())
        .map_err(|e| e.to_string())?;
    let json = campaign.to_json().map_err(|e| e.to_string())?;

    fs::create_dir_all(dir).map_err(|e| format!("cannot create directory: {e}"))?;
    fs::write(dir.join("campaign.json"), json)
        .map_err(|e| format!("cannot write campaign.json: {e}"))?;

    println!("Created campaign '{}' in {}/", name, name);
    println!("  campaign.json  - a Fighter class and the level 1 character Aldric");
    println!();
    println!("Get started:");
    println!("  cd {}", name);
    println!("  hf check                      # Validate the campaign");
    println!("  hf stats Aldric               # Show derived stats");
    println!("  hf level-up Aldric --xp 1000 --raise STR,CON --skills Athletics=1,Perception=1");

    Ok(())
}
