//! Global configuration management.
//!
//! The global file holds user-wide engine defaults. It lives at
//! `~/.itdgen/config.toml` (`%LOCALAPPDATA%\itdgen\config.toml` on Windows), or wherever
//! `ITDGEN_CONFIG` points. A missing file is not an error: the defaults apply.
//!
//! ```toml
//! [engine]
//! cache_capacity = 5000
//! aspect_infix = "_Roo_"
//! pipeline_buffer = 64
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_ASPECT_INFIX, DEFAULT_PIPELINE_BUFFER, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};
use crate::core::MetadataError;
use crate::model::is_java_identifier;

/// Settings that shape how the metadata engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of cached items; `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,

    /// Text between the governor name and the generator suffix in aspect names.
    pub aspect_infix: String,

    /// Change events queued before producers wait.
    pub pipeline_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            aspect_infix: DEFAULT_ASPECT_INFIX.to_string(),
            pipeline_buffer: DEFAULT_PIPELINE_BUFFER,
        }
    }
}

impl EngineConfig {
    /// Check the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ConfigError`] if the cache capacity or pipeline buffer is
    /// zero, or if the aspect infix would not produce a Java identifier.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.cache_capacity == Some(0) {
            return Err(config_error("cache_capacity must be at least 1"));
        }
        if self.pipeline_buffer == 0 {
            return Err(config_error("pipeline_buffer must be at least 1"));
        }
        if !is_java_identifier(&format!("A{}B", self.aspect_infix)) {
            return Err(config_error(format!(
                "aspect_infix '{}' cannot be part of a Java type name",
                self.aspect_infix
            )));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> MetadataError {
    MetadataError::ConfigError {
        message: message.into(),
    }
}

/// Global configuration structure for itdgen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub engine: EngineConfig,
}

impl GlobalConfig {
    /// Load from `ITDGEN_CONFIG` or the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise as [`load`](Self::load) does.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!("No global config at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or holds invalid
    /// engine settings.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))?;
        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// `ITDGEN_CONFIG` if set, else the platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("itdgen")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(GLOBAL_CONFIG_DIR)
        };

        Ok(config_dir.join(GLOBAL_CONFIG_FILE))
    }
}
