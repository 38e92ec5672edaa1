//! Pipeline configuration

use config::{Config, Environment, File};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use threat_analysis::ChatConfig;

use detection::VisionConfig;

/// Accepted emergency-contact formats (international forms allowed)
static CONTACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+]?[(]?\d{3}[)]?[-\s.]?\d{3}[-\s.]?\d{4,6}$").unwrap());

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid emergency contact: {0}")]
    InvalidContact(String),
}

/// Language-model service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        let defaults = ChatConfig::default();
        Self {
            api_key: defaults.api_key,
            endpoint: defaults.endpoint,
            model: defaults.model,
        }
    }
}

impl From<ChatSettings> for ChatConfig {
    fn from(settings: ChatSettings) -> Self {
        Self {
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            model: settings.model,
        }
    }
}

/// Object-detection service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub api_key: String,
    pub endpoint: String,
}

impl Default for VisionSettings {
    fn default() -> Self {
        let defaults = VisionConfig::default();
        Self {
            api_key: defaults.api_key,
            endpoint: defaults.endpoint,
        }
    }
}

impl From<VisionSettings> for VisionConfig {
    fn from(settings: VisionSettings) -> Self {
        Self {
            endpoint: settings.endpoint,
            api_key: settings.api_key,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chat: ChatSettings,
    pub vision: VisionSettings,

    /// Phone number for the SMS gateway; optional but validated when set
    pub emergency_contact: Option<String>,

    /// Path for the file-backed alert history
    pub history_path: Option<String>,
}

impl Settings {
    /// Load from an optional config file layered under environment
    /// variables (prefix `SENTINEL`, nested keys joined with `__`).
    pub fn load(config_file: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(config_file).required(false))
            .add_source(Environment::with_prefix("SENTINEL").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(contact) = &self.emergency_contact {
            if !CONTACT_PATTERN.is_match(contact) {
                return Err(ConfigError::InvalidContact(contact.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_contact(contact: &str) -> Settings {
        Settings {
            emergency_contact: Some(contact.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_contacts_accepted() {
        for contact in [
            "1234567890",
            "+911234567890",
            "(123)456-7890",
            "123-456-7890",
            "123 456 7890",
            "123.456.789012",
        ] {
            assert!(with_contact(contact).validate().is_ok(), "contact: {contact}");
        }
    }

    #[test]
    fn test_invalid_contacts_rejected() {
        for contact in ["", "abc", "12-34", "123456789012345678", "12 3456 7890"] {
            assert!(with_contact(contact).validate().is_err(), "contact: {contact}");
        }
    }

    #[test]
    fn test_missing_contact_is_fine() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_point_at_known_services() {
        let settings = Settings::default();
        assert!(settings.chat.endpoint.contains("chat/completions"));
        assert_eq!(settings.chat.model, "llama3-70b-8192");
        assert!(settings.vision.endpoint.contains("images:annotate"));
    }
}
