use std::path::Path;

use colored::Colorize;
use hf_core::{Attribute, Campaign};
use hf_mechanics::{HitPointGain, LevelUpSequence, ProgressionConfig, SequenceProgress};
use hf_mechanics::levelup::HitPointSource;

/// Per-level choices from the command line. The last entry of each list is
/// reused for levels beyond its length.
pub struct LevelUpArgs<'a> {
    pub character: &'a str,
    pub xp: u64,
    pub raise: &'a [String],
    pub skills: &'a [String],
    pub hp: &'a [String],
    pub advanced: bool,
    pub seed: Option<u64>,
    pub player: Option<&'a str>,
}

fn pick(list: &[String], index: usize) -> Option<&str> {
    list.get(index).or_else(|| list.last()).map(String::as_str)
}

/// Parse `STR,CON` or `STR=3,DEX` into single points.
fn parse_raise(input: &str) -> Result<Vec<Attribute>, String> {
    let mut points = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, count) = match part.split_once('=') {
            Some((name, count)) => {
                let count: u32 = count
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid point count in '{part}'"))?;
                (name.trim(), count)
            }
            None => (part, 1),
        };
        let attribute =
            Attribute::parse(name).ok_or_else(|| format!("unknown attribute '{name}'"))?;
        points.extend(std::iter::repeat_n(attribute, count as usize));
    }
    Ok(points)
}

/// Parse `Climb=1,Swim=2`. A bare name means one point.
fn parse_skills(input: &str) -> Result<Vec<(String, u32)>, String> {
    input.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, count)) => count
                .trim()
                .parse()
                .map(|n| (name.trim().to_string(), n))
                .map_err(|_| format!("invalid point count in '{part}'")),
            None => Ok((part.to_string(), 1)),
        })
        .collect()
}

fn describe_hit_points(gain: &HitPointGain) -> String {
    match &gain.source {
        HitPointSource::Rolled(roll) => format!("+{} (rolled {roll})", gain.value),
        HitPointSource::Manual { .. } => format!("+{} (entered)", gain.value),
    }
}

/// Fill in every step of the open session and stop on `Confirm`.
fn fill_level(
    sequence: &mut LevelUpSequence,
    args: &LevelUpArgs<'_>,
    index: usize,
) -> Result<(), String> {
    let session = sequence
        .session_mut()
        .ok_or("the level-up sequence has already finished")?;
    let level = session.target().target_level;

    if args.advanced {
        session.set_advanced(true).map_err(|e| e.to_string())?;
    }
    let raise = pick(args.raise, index)
        .ok_or_else(|| format!("no --raise given for level {level}"))?;
    for attribute in parse_raise(raise)? {
        session
            .increment_attribute(attribute)
            .map_err(|e| e.to_string())?;
    }
    session.next().map_err(|e| e.to_string())?;

    if let Some(list) = pick(args.skills, index) {
        for (skill, points) in parse_skills(list)? {
            session
                .allocate_skill(&skill, points)
                .map_err(|e| e.to_string())?;
        }
    }
    session.next().map_err(|e| e.to_string())?;

    match pick(args.hp, index) {
        None | Some("roll") => {
            sequence.roll_hit_points().map_err(|e| e.to_string())?;
        }
        Some(value) => {
            let value: i64 = value
                .parse()
                .map_err(|_| format!("--hp must be 'roll' or a number, got '{value}'"))?;
            let session = sequence
                .session_mut()
                .ok_or("the level-up sequence has already finished")?;
            let gain = session
                .enter_hit_points(value)
                .map_err(|e| e.to_string())?;
            if gain.should_have_rerolled() {
                eprintln!(
                    "  {}",
                    format!(
                        "warning: {value} HP is at or below the CON modifier and should have been rerolled"
                    )
                    .yellow()
                );
            }
        }
    }

    sequence
        .session_mut()
        .ok_or("the level-up sequence has already finished")?
        .next()
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Print the confirm step's delta.
fn print_pending(sequence: &LevelUpSequence) {
    let Some(pending) = sequence.session().and_then(|s| s.pending()) else {
        return;
    };
    let mode = if pending.mode.is_advanced() {
        " (advanced)"
    } else {
        ""
    };
    println!(
        "  {}{}",
        format!("Level {} -> {}", pending.from_level, pending.new_level).bold(),
        mode.dimmed()
    );
    println!("    attributes: {}", pending.attribute_changes);
    if pending.skill_allocations.is_empty() {
        println!("    skills:     -");
    } else {
        let skills: Vec<String> = pending
            .skill_allocations
            .iter()
            .map(|(name, points)| format!("{name} +{points}"))
            .collect();
        println!("    skills:     {}", skills.join(", "));
    }
    println!("    hit points: {}", describe_hit_points(&pending.hit_points));
}

/// Fill, show, and commit one level.
fn advance(
    sequence: &mut LevelUpSequence,
    campaign: &mut Campaign,
    args: &LevelUpArgs<'_>,
    requester: Option<&str>,
    index: usize,
) -> Result<SequenceProgress, String> {
    fill_level(sequence, args, index)?;
    print_pending(sequence);
    sequence
        .commit(campaign, requester)
        .map_err(|e| e.to_string())
}

pub fn run(file: &Path, args: &LevelUpArgs<'_>) -> Result<(), String> {
    let mut campaign = super::load_campaign(file)?;
    let id = campaign
        .character_id(args.character)
        .map_err(|e| e.to_string())?;
    let requester = match args.player {
        Some(player) => Some(player.to_string()),
        None => campaign.get_character(id).map(|c| c.owner.clone()),
    };

    let mut config =
        ProgressionConfig::from_settings(&campaign.settings).map_err(|e| e.to_string())?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sequence = LevelUpSequence::trigger(&mut campaign, id, args.xp, &config)
        .map_err(|e| e.to_string())?;

    let mut index = 0;
    let final_level = loop {
        match advance(
            &mut sequence,
            &mut campaign,
            args,
            requester.as_deref(),
            index,
        ) {
            Ok(SequenceProgress::Advanced { .. }) => index += 1,
            Ok(SequenceProgress::Completed { final_level }) => break final_level,
            Err(e) => {
                if !sequence.is_finished() {
                    if let Err(cancel_err) = sequence.cancel(&mut campaign) {
                        tracing::warn!(error = %cancel_err, "could not cancel level-up sequence");
                    }
                }
                return Err(e);
            }
        }
    };

    super::save_campaign(file, &campaign)?;

    let character = campaign
        .get_character(id)
        .ok_or_else(|| format!("character vanished: {id}"))?;
    println!();
    println!(
        "  {} is now level {} (HP {}/{}, XP {})",
        character.name.bold(),
        final_level,
        character.current_hp,
        character.max_hp,
        character.experience
    );

    Ok(())
}
