mod schema;

pub use schema::{
    Config, OutputSettings, Settings, VerifySettings, DEFAULT_LOG_LEVEL, LOG_LEVELS,
};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

const CONFIG_ENV_VAR: &str = "FORMLOGIC_CONFIG";

pub fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    // ~/.formlogic/config.json, or ./.formlogic when there is no home
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".formlogic")
        .join("config.json")
}

/// --config beats FORMLOGIC_CONFIG beats the default location
pub fn get_config_path_with_override(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(path) => path.to_path_buf(),
        None => get_config_path(),
    }
}

pub fn load() -> Result<Config> {
    load_with_override(None)
}

pub fn load_with_override(override_path: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(override_path);

    if !path.exists() {
        let config = Config::default();
        // a missing config must never block evaluation
        if let Err(e) = save_with_override(&config, override_path) {
            warn!("could not write default config to {}: {:#}", path.display(), e);
        }
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, override_path: Option<&Path>) -> Result<()> {
    let path = get_config_path_with_override(override_path);

    // ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["settings", "log_level"] => {
            let level = value.to_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(anyhow!(
                    "Invalid log_level: {}. Use one of: {}",
                    value,
                    LOG_LEVELS.join(", ")
                ));
            }
            config.settings.log_level = level;
        }
        ["settings", "output", "pretty"] => {
            config.settings.output.pretty = parse_bool(value)?;
        }
        ["settings", "verify", "strict"] => {
            config.settings.verify.strict = parse_bool(value)?;
        }
        _ => {
            return Err(anyhow!(
                "Unknown config key: {}. Valid keys: settings.log_level, settings.output.pretty, settings.verify.strict",
                key
            ));
        }
    }

    Ok(())
}

pub fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "Invalid boolean value: {}. Use true/false, yes/no, 1/0, or on/off",
            value
        )),
    }
}
