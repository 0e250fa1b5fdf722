//! `set`, `unset` and `config` commands.

use std::error::Error;

use crate::core::config::data::{path_display, SETTING_KEYS};
use crate::core::config::Config;

pub fn set_setting(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Err(e) = config.set_value(key, value) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
    config.save()?;
    let shown = if value.trim().is_empty() {
        "(empty)"
    } else {
        value.trim()
    };
    println!("✅ Set {key} to: {shown}");
    Ok(())
}

pub fn unset_setting(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Err(e) = config.unset_value(key) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
    config.save()?;
    println!("✅ Unset {key}");
    Ok(())
}

pub fn show_config() -> Result<(), Box<dyn Error>> {
    let path = Config::get_config_path()?;
    let config = Config::load_from_path(&path)?;
    println!("⚙️  Configuration ({})", path_display(&path));
    println!();
    println!("{}", config.describe());
    println!();
    println!("Keys: {}", SETTING_KEYS.join(", "));
    Ok(())
}
