use anyhow::Result;
use leavecal_core::config::LeavecalConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = LeavecalConfig::config_path()?;

    if config_path.exists() {
        println!(
            "Config already exists at {}",
            config_path.display().to_string().dimmed()
        );
        return Ok(());
    }

    LeavecalConfig::create_default_config(&config_path)?;

    println!("{} Created {}", "✓".green(), config_path.display());
    println!("\nAdd a [[tenants]] entry and, to send by email, a [mail] section.");

    Ok(())
}
