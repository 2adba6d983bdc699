use crate::shared::errors::MarketError;
use crate::shared::types::MarketSettings;
use std::fs;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a toml file
    pub fn load_config(path: &str) -> Result<MarketSettings, MarketError> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| MarketError::InvalidInput(format!("Failed to read config file: {}", e)))?;

        let settings: MarketSettings = toml::from_str(&config_content)
            .map_err(|e| MarketError::InvalidInput(format!("Failed to parse config file: {}", e)))?;

        Ok(settings)
    }

    /// Load settings from a file when present, defaults otherwise
    pub fn load_or_default(path: &str) -> Result<MarketSettings, MarketError> {
        if Path::new(path).exists() {
            Self::load_config(path)
        } else {
            Ok(MarketSettings::default())
        }
    }
}
