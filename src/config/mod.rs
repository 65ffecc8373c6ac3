use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when the config file parsed but its values can't be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Canary mode requires a dev_guild_id to register commands in")]
    MissingDevGuild,
}

/// Corresponds to the customizable config file that can be modified by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub invite_url: String,     // OAuth2 url used to invite the bot
    pub repository_url: String, // Where the code of the bot lives
    pub website_url: String,
    #[serde(default)]
    pub canary: bool, // Register commands in the dev guild only
    #[serde(default)]
    pub dev_guild_id: Option<u64>,
    pub primary_color: u32,
    pub company_bio: String,
    pub bot_bio: String,
    #[serde(default = "default_statistics_path")]
    pub statistics_path: PathBuf, // The JSON document holding the global counters
}

fn default_statistics_path() -> PathBuf {
    PathBuf::from("./config/statistics.json")
}

impl Config {
    /// Read and validate the config file at the given path
    pub fn from(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(format!("Could not read {path}"))?;
        Self::parse(&content).context(format!("Could not parse {path}"))
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        if config.canary && config.dev_guild_id.is_none() {
            return Err(ConfigError::MissingDevGuild.into());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};

    const MINIMAL: &str = r#"{
        "invite_url": "https://discord.com/oauth2/authorize?client_id=1",
        "repository_url": "https://github.com/whisper-room/bot",
        "website_url": "https://whisper.room",
        "primary_color": 5793266,
        "company_bio": "We build things",
        "bot_bio": "I answer things"
    }"#;

    #[test]
    fn parse_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert!(!config.canary);
        assert_eq!(config.dev_guild_id, None);
        assert_eq!(
            config.statistics_path.to_str(),
            Some("./config/statistics.json")
        );
        assert_eq!(config.primary_color, 0x5865F2);
    }

    #[test]
    fn canary_requires_dev_guild() {
        let content = MINIMAL.replace("\"primary_color\"", "\"canary\": true, \"primary_color\"");
        let err = Config::parse(&content).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingDevGuild)
        ));
    }

    #[test]
    fn canary_with_dev_guild() {
        let content = MINIMAL.replace(
            "\"primary_color\"",
            "\"canary\": true, \"dev_guild_id\": 42, \"primary_color\"",
        );
        let config = Config::parse(&content).unwrap();
        assert!(config.canary);
        assert_eq!(config.dev_guild_id, Some(42));
    }

    #[test]
    fn missing_field_fails() {
        assert!(Config::parse("{}").is_err());
    }
}
