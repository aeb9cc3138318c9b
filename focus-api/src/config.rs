use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file used when neither the command line nor `FOCUS_CONFIG` names one.
pub const DEFAULT_CONFIG_PATH: &str = "focus.toml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// One side of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub color: String,
}

/// Server configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Socket address to listen on.
    pub bind: String,
    pub player_a: PlayerConfig,
    pub player_b: PlayerConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind: "0.0.0.0:8000".to_string(),
            player_a: PlayerConfig {
                name: "Ann".to_string(),
                color: "Red".to_string(),
            },
            player_b: PlayerConfig {
                name: "Bob".to_string(),
                color: "Blue".to_string(),
            },
        }
    }
}

impl ApiConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Validation("bind must not be empty".into()));
        }
        for (key, player) in [("player_a", &self.player_a), ("player_b", &self.player_b)] {
            if player.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{}.name must not be empty", key)));
            }
            if player.color.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{}.color must not be empty", key)));
            }
        }
        if self.player_a.name.to_uppercase() == self.player_b.name.to_uppercase() {
            return Err(ConfigError::Validation(
                "player_a.name and player_b.name must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Pick the config path: command-line argument, then `FOCUS_CONFIG`, then the default.
pub fn resolve_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
