use crate::config::Config;
use crate::providers::{GeminiProvider, OpenAIProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::time::Duration;

const GEMINI_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GEMA_API_KEY"];
const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY", "GEMA_OPENAI_API_KEY"];

pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>> {
    create_provider_with_env(config, |var| std::env::var(var).ok())
}

fn create_provider_with_env(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("gemini");
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match provider_name.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = resolve_api_key(GEMINI_KEY_VARS, &config.api_key, &env)?;
            let mut provider = GeminiProvider::new(api_key)
                .with_temperature(config.temperature)
                .with_timeout(timeout);
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key(OPENAI_KEY_VARS, &config.api_key, &env)?;
            let mut provider = OpenAIProvider::new(api_key)
                .with_temperature(config.temperature)
                .with_timeout(timeout);
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: gemini, openai",
            provider_name
        )),
    }
}

fn resolve_api_key(
    env_vars: &[&str],
    config_key: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(key) = env_vars
        .iter()
        .filter_map(|var| env(var))
        .find(|key| !key.trim().is_empty())
    {
        return Ok(key);
    }

    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set one of {} or api_key in the config file",
            env_vars.join(", ")
        ))
    }
}
