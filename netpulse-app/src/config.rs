use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub admin: AdminConfig,
    pub demo_user: DemoUserConfig,
    pub speed_test: SpeedTestConfig,
    pub export: ExportConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_test.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "speed_test.tick_interval_ms",
                reason: "must be greater than zero",
            });
        }
        let name = self.demo_user.name.trim();
        if name.is_empty() || name.chars().any(char::is_control) {
            return Err(ConfigError::Invalid {
                field: "demo_user.name",
                reason: "must be a non-empty single line",
            });
        }
        Ok(())
    }
}

/// The single hard-coded privileged credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@netpulse.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Profile handed out by the stub user login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoUserConfig {
    pub name: String,
    pub location: String,
}

impl Default for DemoUserConfig {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            location: "Newark, NJ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTestConfig {
    pub tick_interval_ms: u64,
}

impl SpeedTestConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}
