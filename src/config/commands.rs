//! Config command handlers

use anyhow::{Context, Result, bail};
use colored::Colorize;

use super::{APP_NAME, Config};
use crate::cli::{ConfigAction, ConfigArgs};
use crate::reader::settings::{Orientation, ReadingMode};

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(),
        ConfigAction::Init { force } => init_config(force),
        ConfigAction::Set { key, value } => set_config(&key, &value),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::Path => show_path(),
        ConfigAction::Edit => edit_config(),
    }
}

fn show_config() -> Result<()> {
    let mut config = Config::load()?;
    config.api.token = config.api.token.map(|t| mask_key(&t));
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config file already exists: {}", path.display()).yellow()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let saved_path = Config::default().save()?;

    println!("{}", "[Config] Initialized".green());
    println!("  Created: {}", saved_path.display());
    println!();
    println!("Set your account to save words and reading progress:");
    println!("  {} config set api.user_id <id>", APP_NAME);

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    // Write back what is in the file, not the environment overrides.
    let mut config = Config::load_file()?;
    apply_key(&mut config, key, value)?;
    config.save()?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());
    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match read_key(&config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, value, e))
}

fn parse_mode(value: &str) -> Result<ReadingMode> {
    match value.to_lowercase().as_str() {
        "word" => Ok(ReadingMode::Word),
        "line" => Ok(ReadingMode::Line),
        _ => bail!("Unknown reading mode: {} (expected word or line)", value),
    }
}

fn parse_orientation(value: &str) -> Result<Orientation> {
    match value.to_lowercase().as_str() {
        "horizontal" => Ok(Orientation::Horizontal),
        "vertical" => Ok(Orientation::Vertical),
        _ => bail!("Unknown orientation: {} (expected horizontal or vertical)", value),
    }
}

pub(crate) fn apply_key(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse(key, value)?,
        ["api", "base_url"] => config.api.base_url = value.to_string(),
        ["api", "user_id"] => config.api.user_id = optional(value),
        ["api", "token"] => config.api.token = optional(value),
        ["api", "timeout_secs"] => config.api.timeout_secs = parse(key, value)?,
        ["reader", "mode"] => config.reader.mode = parse_mode(value)?,
        ["reader", "orientation"] => config.reader.orientation = parse_orientation(value)?,
        ["reader", "font_size"] => config.reader.font_size = parse(key, value)?,
        ["reader", "line_height"] => config.reader.line_height = parse(key, value)?,
        ["reader", "margin"] => config.reader.margin = parse(key, value)?,
        ["reader", "show_translation"] => config.reader.show_translation = parse(key, value)?,
        ["reader", "progress_quiet_ms"] => config.reader.progress_quiet_ms = parse(key, value)?,
        ["translation", "source_lang"] => config.translation.source_lang = optional(value),
        ["translation", "target_lang"] => config.translation.target_lang = value.to_string(),
        ["translation", "save_language"] => config.translation.save_language = value.to_string(),
        ["cache", "enabled"] => config.cache.enabled = parse(key, value)?,
        ["cache", "path"] => config.cache.path = optional(value),
        _ => bail!("Unknown config key: {}", key),
    }

    Ok(())
}

pub(crate) fn read_key(config: &Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "verbose"] => Some(config.general.verbose.to_string()),
        ["api", "base_url"] => Some(config.api.base_url.clone()),
        ["api", "user_id"] => config.api.user_id.clone(),
        ["api", "token"] => config.api.token.as_deref().map(mask_key),
        ["api", "timeout_secs"] => Some(config.api.timeout_secs.to_string()),
        ["reader", "mode"] => Some(format!("{:?}", config.reader.mode).to_lowercase()),
        ["reader", "orientation"] => Some(format!("{:?}", config.reader.orientation).to_lowercase()),
        ["reader", "font_size"] => Some(config.reader.font_size.to_string()),
        ["reader", "line_height"] => Some(config.reader.line_height.to_string()),
        ["reader", "margin"] => Some(config.reader.margin.to_string()),
        ["reader", "show_translation"] => Some(config.reader.show_translation.to_string()),
        ["reader", "progress_quiet_ms"] => Some(config.reader.progress_quiet_ms.to_string()),
        ["translation", "source_lang"] => config.translation.source_lang.clone(),
        ["translation", "target_lang"] => Some(config.translation.target_lang.clone()),
        ["translation", "save_language"] => Some(config.translation.save_language.clone()),
        ["cache", "enabled"] => Some(config.cache.enabled.to_string()),
        ["cache", "path"] => config.cache.path.clone(),
        _ => bail!("Unknown config key: {}", key),
    };

    Ok(value)
}

fn show_path() -> Result<()> {
    match Config::config_path() {
        Some(path) => {
            println!("{}", path.display());
            if path.exists() {
                println!("{}", "(exists)".green());
            } else {
                println!("{}", "(not created)".yellow());
            }
        }
        None => {
            println!("{}", "Could not determine config path".red());
        }
    }
    Ok(())
}

fn edit_config() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        Config::default().save()?;
        println!("{}", "[Config] Created default config".green());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening config with: {}", editor);
    println!("Path: {}", path.display());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .context(format!("Failed to open editor: {}", editor))?;

    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_through_keys() {
        let mut config = Config::default();
        apply_key(&mut config, "reader.mode", "line").unwrap();
        apply_key(&mut config, "api.user_id", "u1").unwrap();
        apply_key(&mut config, "translation.source_lang", "").unwrap();

        assert_eq!(read_key(&config, "reader.mode").unwrap().as_deref(), Some("line"));
        assert_eq!(read_key(&config, "api.user_id").unwrap().as_deref(), Some("u1"));
        assert_eq!(read_key(&config, "translation.source_lang").unwrap(), None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        assert!(apply_key(&mut config, "reader.font_size", "big").is_err());
        assert!(apply_key(&mut config, "reader.orientation", "diagonal").is_err());
        assert!(apply_key(&mut config, "nope.key", "1").is_err());
        assert!(read_key(&config, "api").is_err());
    }

    #[test]
    fn test_token_is_masked() {
        let mut config = Config::default();
        apply_key(&mut config, "api.token", "abcdef1234567890").unwrap();
        assert_eq!(
            read_key(&config, "api.token").unwrap().as_deref(),
            Some("abcd...7890")
        );
        assert_eq!(mask_key("short"), "*****");
    }
}
