//! Support command implementation.

use anyhow::Result;
use colored::Colorize;
use safecase_core::{SupportCategory, SupportDirectory, SupportResource, ThreatLevel};

/// Execute the support command.
///
/// With a threat level, prints the recommended resources in urgency order;
/// otherwise the directory, optionally filtered by category.
pub fn execute(
    category: Option<SupportCategory>,
    threat_level: Option<ThreatLevel>,
    json: bool,
) -> Result<()> {
    let directory = SupportDirectory::default();

    let resources: Vec<&SupportResource> = match (threat_level, category) {
        (Some(level), _) => directory.recommend(level),
        (None, Some(category)) => directory.by_category(category),
        (None, None) => directory.all().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }

    if let Some(level) = threat_level {
        println!();
        println!(
            "{} {}",
            "Recommended support for threat level:".bold(),
            level.as_str().to_uppercase()
        );
    }

    let mut current: Option<SupportCategory> = None;
    for resource in resources {
        if current != Some(resource.category) {
            current = Some(resource.category);
            println!();
            println!("{}", resource.category.label().cyan().bold());
        }

        let availability = if resource.available_24_7 {
            " (24/7)".green().to_string()
        } else {
            String::new()
        };
        println!("   {}{}", resource.contact_line(), availability);
        println!("      {}", resource.description.dimmed());
    }

    println!();
    println!("{}", directory.closing_line().yellow());
    Ok(())
}
