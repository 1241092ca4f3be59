//! YAML engine configuration.

use std::path::Path;

use mm_engine::{ConfigError, EngineConfig};

/// Why a configuration file could not be used.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// Could not read the file
    Io(std::io::Error),
    /// Not valid YAML for an engine configuration
    Yaml(serde_yaml::Error),
    /// Parsed, but the values are out of range
    Invalid(ConfigError),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(e) => write!(f, "Config read error: {}", e),
            ConfigLoadError::Yaml(e) => write!(f, "Config parse error: {}", e),
            ConfigLoadError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::Io(e) => Some(e),
            ConfigLoadError::Yaml(e) => Some(e),
            ConfigLoadError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigLoadError {
    fn from(e: std::io::Error) -> Self {
        ConfigLoadError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigLoadError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigLoadError::Yaml(e)
    }
}

impl From<ConfigError> for ConfigLoadError {
    fn from(e: ConfigError) -> Self {
        ConfigLoadError::Invalid(e)
    }
}

/// Parse and validate a configuration. Missing keys take their defaults.
pub fn parse_config(yaml: &str) -> Result<EngineConfig, ConfigLoadError> {
    let config: EngineConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigLoadError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)?;
    let config = parse_config(&yaml)?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}
