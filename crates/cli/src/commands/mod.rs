pub mod ask;
pub mod reflect;
pub mod tools;

use reagent_config::Settings;

/// Load settings and fail early with setup instructions when no API key
/// is configured.
pub fn load_settings() -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = Settings::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if settings.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    LLM_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!(
            "    {}",
            Settings::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(settings)
}
