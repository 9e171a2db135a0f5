use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration manager for keylink settings
/// Provides a layered configuration system that separates schema, available options, and persisted
/// values. Configuration is stored in the platform config directory by default
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Runtime settings for the control surface bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // MIDI settings
    /// Substring matched against MIDI input port names.
    pub midi_input_port: String,
    /// Substring matched against MIDI output port names.
    pub midi_output_port: String,
    /// Client name registered with the MIDI backend.
    pub client_name: String,

    // Surface settings
    /// Blank every LED when the bridge exits.
    pub clear_on_exit: bool,

    // Loopback session settings
    pub loopback_tracks: usize,
    pub loopback_sends: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midi_input_port: "APC Key 25".to_string(),
            midi_output_port: "APC Key 25".to_string(),
            client_name: "keylink".to_string(),
            clear_on_exit: true,
            loopback_tracks: 8,
            loopback_sends: 2,
        }
    }
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub midi: MidiConfigSchema,
    pub surface: SurfaceConfigSchema,
    pub loopback: LoopbackConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiConfigSchema {
    pub midi_input_port: ConfigOption<String>,
    pub midi_output_port: ConfigOption<String>,
    pub client_name: ConfigOption<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfigSchema {
    pub clear_on_exit: ConfigOption<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopbackConfigSchema {
    pub loopback_tracks: ConfigOption<usize>,
    pub loopback_sends: ConfigOption<usize>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
    pub requires_restart: bool,
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'keylink/config.json' in the platform config directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(Self::default_path);

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("keylink").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load settings from configuration file
    /// Creates the file with default settings if it doesn't exist
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        // Ensure config directory exists (if config is in a subdirectory)
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Update settings and save to file
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    /// Get current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        ConfigSchema {
            midi: MidiConfigSchema {
                midi_input_port: ConfigOption {
                    default: "APC Key 25".to_string(),
                    valid_range: None,
                    valid_choices: None, // Populated from port enumeration
                    description: "MIDI input port the controller is attached to".to_string(),
                    requires_restart: true,
                },
                midi_output_port: ConfigOption {
                    default: "APC Key 25".to_string(),
                    valid_range: None,
                    valid_choices: None,
                    description: "MIDI output port used for LED feedback".to_string(),
                    requires_restart: true,
                },
                client_name: ConfigOption {
                    default: "keylink".to_string(),
                    valid_range: None,
                    valid_choices: None,
                    description: "Client name shown by the MIDI backend".to_string(),
                    requires_restart: true,
                },
            },
            surface: SurfaceConfigSchema {
                clear_on_exit: ConfigOption {
                    default: true,
                    valid_range: None,
                    valid_choices: None,
                    description: "Turn every LED off on shutdown".to_string(),
                    requires_restart: false,
                },
            },
            loopback: LoopbackConfigSchema {
                loopback_tracks: ConfigOption {
                    default: 8,
                    valid_range: Some((0, 8)),
                    valid_choices: None,
                    description: "Number of existing tracks in the loopback session".to_string(),
                    requires_restart: true,
                },
                loopback_sends: ConfigOption {
                    default: 2,
                    valid_range: Some((0, 8)),
                    valid_choices: None,
                    description: "Number of sends per loopback track".to_string(),
                    requires_restart: true,
                },
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if settings.midi_input_port.trim().is_empty() {
            errors.push("midi_input_port must not be empty".to_string());
        }

        if settings.client_name.trim().is_empty() {
            errors.push("client_name must not be empty".to_string());
        }

        if let Some((min, max)) = schema.loopback.loopback_tracks.valid_range {
            if settings.loopback_tracks < min || settings.loopback_tracks > max {
                errors.push(format!("loopback_tracks must be between {} and {}", min, max));
            }
        }

        if let Some((min, max)) = schema.loopback.loopback_sends.valid_range {
            if settings.loopback_sends < min || settings.loopback_sends > max {
                errors.push(format!("loopback_sends must be between {} and {}", min, max));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_config_manager_new() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let manager = ConfigManager::new(Some(config_path.clone()));
        assert_eq!(manager.config_path(), config_path);
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        let settings = manager.load().unwrap();

        assert_eq!(settings, Settings::default());
        assert!(config_path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));

        let settings = Settings {
            midi_input_port: "APC Key 25 MIDI 1".to_string(),
            loopback_tracks: 3,
            ..Settings::default()
        };
        manager.update_settings(settings.clone()).unwrap();

        let mut reloaded = ConfigManager::new(Some(config_path));
        assert_eq!(reloaded.load().unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.json");
        fs::write(
            &config_path,
            r#"{"version":"0.0.0","settings":{"client_name":"stage-left"},"created_at":"","modified_at":""}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        let settings = manager.load().unwrap();
        assert_eq!(settings.client_name, "stage-left");
        assert_eq!(settings.midi_output_port, "APC Key 25");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        assert!(matches!(manager.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_settings() {
        assert!(ConfigManager::validate_settings(&Settings::default()).is_ok());

        let settings = Settings {
            midi_input_port: " ".to_string(),
            loopback_tracks: 9,
            ..Settings::default()
        };
        let errors = ConfigManager::validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);

        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new(Some(temp_dir.path().join("c.json")));
        assert!(matches!(
            manager.update_settings(settings),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
