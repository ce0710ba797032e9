//! Generic TOML parsing with file path context.
//!
//! ```rust,no_run
//! use itdgen::config::parse_config;
//! use itdgen::config::ProjectFile;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let project: ProjectFile = parse_config(Path::new("itdgen.toml")).await?;
//! println!("{} types", project.types.len());
//! # Ok(())
//! # }
//! ```
//!
//! Errors carry two levels of context, the operation and the underlying cause:
//! ```text
//! Failed to parse config file: /path/to/itdgen.toml
//! Caused by:
//!     invalid type name: com.example.2Bad (not a qualified Java name)
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Read `path` and deserialize it as TOML into `T`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub async fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content, path)
}

/// Deserialize `content`, attributing errors to `origin`.
///
/// # Errors
///
/// Returns an error if `content` is not valid TOML or does not match `T`.
pub fn parse_config_str<T>(content: &str, origin: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    toml::from_str(content).with_context(|| format!("Failed to parse config file: {}", origin.display()))
}
