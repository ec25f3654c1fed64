use crate::recurrence::ParsePolicy;
use crate::schedule::{ImportOptions, ImportPipeline, DEFAULT_TIMEZONE};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Timezone applied to documents that do not name one
    pub default_timezone: String,
    pub rrule_policy: ParsePolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { default_timezone: DEFAULT_TIMEZONE.to_string(), rrule_policy: ParsePolicy::Lenient }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    /// Load from the platform config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}; using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .pipeline()
            .with_context(|| format!("Invalid [import] section in {}", path.display()))?;

        Ok(config)
    }

    /// Write to the platform config directory and return the path written
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Import pipeline built from the `[import]` section
    pub fn pipeline(&self) -> Result<ImportPipeline> {
        Ok(ImportPipeline::new(self.import_options())?)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            default_timezone: self.import.default_timezone.clone(),
            rrule_policy: self.import.rrule_policy,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "schedule-import", "schedule-import")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
