use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const GEMA_DIR: &str = ".gema";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    /// Unset means the backend's own default model.
    pub model: Option<String>,
    pub temperature: f64,
    pub request_timeout_secs: u64,
    pub tools_enabled: bool,
    pub assistant_name: String,
    pub system_prompt: String,
    pub input_prompt: String,
    pub exit_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: None,
            temperature: 0.7,
            request_timeout_secs: 120,
            tools_enabled: true,
            assistant_name: "Gema".to_string(),
            system_prompt: "Você é um assistente prestativo chamado Gema.".to_string(),
            input_prompt: "Fala meu cumpade: ".to_string(),
            exit_command: "sair".to_string(),
        }
    }
}

pub fn get_gema_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(GEMA_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_gema_dir().join("config.toml")
}

pub fn ensure_gema_dir() -> Result<PathBuf> {
    let gema_dir = get_gema_dir();

    if !gema_dir.exists() {
        std::fs::create_dir_all(&gema_dir).with_context(|| {
            format!("Failed to create gema directory at {}", gema_dir.display())
        })?;
    }

    Ok(gema_dir)
}

impl Config {
    /// Loads `~/.gema/config.toml` if present, defaults otherwise.
    pub fn load_or_default() -> Result<Self> {
        let path = get_config_path();
        if path.exists() {
            load_config_from(&path)
        } else {
            Ok(Config::default())
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    ensure_gema_dir()?;

    let config_path = get_config_path();
    save_config_to(config, &config_path)?;
    Ok(config_path)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}
