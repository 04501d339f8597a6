use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE: &str = "scratchcard.toml";
pub const DEFAULT_INIT_EVENT: &str = "scratchcard:init";
pub const DEFAULT_CLOSE_EVENT: &str = "scratchcard:close";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub replay: ReplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Tag the overlay opens on
    pub init_event: String,
    /// Tag the overlay closes on
    pub close_event: String,
    /// Pause between envelopes, in milliseconds
    pub delay_ms: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            init_event: DEFAULT_INIT_EVENT.to_string(),
            close_event: DEFAULT_CLOSE_EVENT.to_string(),
            delay_ms: 0,
        }
    }
}

impl ReplayConfig {
    /// Load `path`, or `scratchcard.toml` in `cwd` when no path is given.
    ///
    /// An explicit path must exist; the implicit one falls back to defaults.
    pub async fn load(path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (cwd.join(CONFIG_FILE), false),
        };

        if !config_path.exists() {
            if explicit {
                bail!("Config file not found: {}", config_path.display());
            }
            debug!(path = %config_path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config.validate()?;

        debug!(path = %config_path.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Write the config, refusing to clobber an existing file.
    pub async fn write_new(&self, path: &Path) -> Result<()> {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.replay.init_event.is_empty() || self.replay.close_event.is_empty() {
            bail!("Event tags in [replay] must not be empty");
        }
        Ok(())
    }
}
