pub mod check;
pub mod init;
pub mod level_up;
pub mod stats;

use std::fs;
use std::path::Path;

use hf_core::{Campaign, CharacterClass, CharacterSnapshot};

/// Read and parse a campaign file.
fn load_campaign(file: &Path) -> Result<Campaign, String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    Campaign::from_json(&json).map_err(|e| format!("{}: {e}", file.display()))
}

/// Write a campaign back to its file.
fn save_campaign(file: &Path, campaign: &Campaign) -> Result<(), String> {
    let json = campaign.to_json().map_err(|e| e.to_string())?;
    fs::write(file, json).map_err(|e| format!("cannot write {}: {e}", file.display()))
}

/// Look up a character and its class by character name.
fn character_and_class<'a>(
    campaign: &'a Campaign,
    name: &str,
) -> Result<(&'a CharacterSnapshot, &'a CharacterClass), String> {
    let character = campaign
        .find_character(name)
        .ok_or_else(|| format!("character not found: \"{name}\""))?;
    let class = campaign.class_of(character).map_err(|e| e.to_string())?;
    Ok((character, class))
}
