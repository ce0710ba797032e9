//! Configuration management for itdgen
//!
//! Two layers feed the engine:
//!
//! 1. **Global configuration** (`~/.itdgen/config.toml`, or `ITDGEN_CONFIG`) - user-wide
//!    [`EngineConfig`] defaults such as the cache capacity and aspect infix
//! 2. **Project file** (`itdgen.toml`) - the physical types to generate for, plus an
//!    optional `[engine]` table overriding the global settings
//!
//! Both are TOML and are read with `tokio::fs`. Errors carry the offending file path via
//! [`anyhow::Context`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::config::{GlobalConfig, ProjectFile};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let global = GlobalConfig::load().await?;
//! let project = ProjectFile::load(Path::new("itdgen.toml")).await?;
//! let engine = project.engine_config(&global.engine);
//! println!("aspects are named <Type>{}<Suffix>", engine.aspect_infix);
//! # Ok(())
//! # }
//! ```

mod global;
mod parser;
mod project;

pub use global::{EngineConfig, GlobalConfig};
pub use parser::{parse_config, parse_config_str};
pub use project::{EngineOverrides, ProjectFile};
