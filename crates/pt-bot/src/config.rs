//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the persisted playtime data file.
    pub data_file: PathBuf,

    /// Game names whose presence activity accrues playtime. Matched
    /// case-insensitively against activity names reported by the platform.
    pub tracked_games: Vec<String>,

    /// Seconds between session checkpoints.
    pub tick_interval_secs: u64,

    /// Chat platform credential, consumed by the external gateway adapter.
    /// Usually supplied via the `PTBOT_BOT_TOKEN` environment variable.
    pub bot_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_file", &self.data_file)
            .field("tracked_games", &self.tracked_games)
            .field("tick_interval_secs", &self.tick_interval_secs)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_file: data_dir.join("playtime.json"),
            tracked_games: vec!["Minecraft".to_string(), "Modrinth".to_string()],
            tick_interval_secs: 60,
            bot_token: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PTBOT_*)
        figment = figment.merge(Env::prefixed("PTBOT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for ptbot.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ptbot"))
}

/// Returns the platform-specific data directory for ptbot.
///
/// On Linux: `~/.local/share/ptbot`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ptbot"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_ptbot() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "ptbot");
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.tracked_games, vec!["Minecraft", "Modrinth"]);
        assert_eq!(config.tick_interval_secs, 60);
        assert!(config.bot_token.is_none());
        assert_eq!(config.data_file.file_name().unwrap(), "playtime.json");
    }

    #[test]
    fn test_load_from_explicit_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
data_file = "/tmp/ptbot-test/playtime.json"
tracked_games = ["Factorio"]
tick_interval_secs = 5
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.tracked_games, vec!["Factorio"]);
        assert_eq!(config.tick_interval_secs, 5);
        assert_eq!(
            config.data_file,
            PathBuf::from("/tmp/ptbot-test/playtime.json")
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            bot_token: Some("super-secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
