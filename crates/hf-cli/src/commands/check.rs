use std::path::Path;

use colored::Colorize;
use hf_mechanics::validate_campaign;

pub fn run(file: &Path) -> Result<(), String> {
    let campaign = super::load_campaign(file)?;
    let issues = validate_campaign(&campaign);

    for issue in &issues {
        let line = issue.to_string();
        if issue.is_error {
            eprintln!("  {}", line.red());
        } else {
            eprintln!("  {}", line.yellow());
        }
    }

    let errors = issues.iter().filter(|i| i.is_error).count();
    let warnings = issues.len() - errors;
    if errors > 0 {
        return Err(format!(
            "{} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        ));
    }

    println!("  All checks passed for '{}'.", campaign.meta.name);
    println!(
        "  {} classes, {} characters, {} warning{}",
        campaign.classes().len(),
        campaign.characters().len(),
        warnings,
        if warnings == 1 { "" } else { "s" },
    );

    Ok(())
}
