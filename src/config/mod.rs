use crate::models::ExporterSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default settings file, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "mo2_exporter.yaml";

/// Environment variable prefix for setting overrides (`MO2_EXPORTER_DEBUG_MODE=true`)
pub const ENV_PREFIX: &str = "MO2_EXPORTER";

/// Configuration manager for the exporter's YAML settings file.
///
/// Settings are layered: built-in defaults, then the YAML file (if present), then
/// `MO2_EXPORTER_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager for the given settings file.
    ///
    /// The file does not need to exist.
    pub fn new<P: AsRef<Utf8Path>>(settings_path: P) -> Self {
        Self {
            settings_path: settings_path.as_ref().to_path_buf(),
        }
    }

    /// Whether the settings file is present; when it is not, `load_settings` uses defaults.
    ///
    /// Settings load before logging is installed, so callers report the fallback
    /// themselves once the subscriber exists.
    pub fn settings_file_exists(&self) -> bool {
        self.settings_path.is_file()
    }

    /// Load the settings, falling back to defaults for anything not set.
    pub fn load_settings(&self) -> Result<ExporterSettings> {
        if !self.settings_file_exists() {
            tracing::debug!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let settings: ExporterSettings = config::Config::builder()
            .add_source(
                config::File::from(self.settings_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclusions"),
            )
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::debug!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the settings file.
    ///
    /// # Arguments
    /// * `settings` - The ExporterSettings to save
    pub fn save_settings(&self, settings: &ExporterSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent))?;
            }
        }

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}
