//! Render the aspects of a project.
//!
//! Without `--output` the aspects are printed to stdout. With it each aspect is written
//! to `<output>/<path>/<package>/<Aspect>.aj`, where `SRC_MAIN_JAVA` maps to
//! `src/main/java`. Files whose content would not change are left untouched, so a
//! second run over an unmodified project writes nothing.
//!
//! `--check` writes nothing and fails if any file is missing or differs.
//!
//! # Examples
//!
//! ```bash
//! itdgen generate
//! itdgen generate --type com.example.Customer
//! itdgen generate --output . --check
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::CliConfig;
use super::common::Workspace;
use crate::itd::ItdTypeDetails;

/// Command to render aspect files.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Only generate for this fully qualified type
    #[arg(long = "type", value_name = "FQN")]
    type_name: Option<String>,

    /// Directory to write aspect files under
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Fail if any aspect file under --output is missing or out of date
    #[arg(long, requires = "output")]
    check: bool,
}

/// What happened to one aspect file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    Written,
    Unchanged,
    Stale,
}

/// Where an aspect lives under `root`.
pub fn aspect_path(root: &Path, itd: &ItdTypeDetails) -> PathBuf {
    let mut path = root.to_path_buf();
    if let Some(logical) = itd.declared_by().path() {
        for segment in logical.as_str().to_lowercase().split('_') {
            path.push(segment);
        }
    }
    for segment in itd.governor().package().split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push(itd.file_name());
    path
}

impl GenerateCommand {
    /// Execute the command against the project at `project_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be loaded, a computation fails, a file
    /// cannot be written, or `--check` finds out-of-date files.
    pub async fn execute(self, config: &CliConfig, project_path: &Path) -> Result<()> {
        let workspace = Workspace::load(config, project_path).await?;
        let computed = workspace.compute(self.type_name.as_deref()).await?;

        let mut failures = 0;
        let mut stale = Vec::new();
        let mut written = 0;
        for entry in &computed {
            let item = match &entry.result {
                Ok(item) => item,
                Err(e) => {
                    failures += 1;
                    eprintln!("{} {}: {}", "✗".red(), entry.id, e);
                    continue;
                }
            };
            let Some(itd) = item.itd() else {
                if !config.quiet {
                    eprintln!(
                        "{} {} ({})",
                        "skipped".yellow(),
                        entry.id,
                        item.invalid_reason().unwrap_or("invalid")
                    );
                }
                continue;
            };

            let rendered = itd.render();
            match &self.output {
                None => print!("{rendered}"),
                Some(root) => {
                    let path = aspect_path(root, itd);
                    match sync_file(&path, &rendered, self.check).await? {
                        FileStatus::Written => {
                            written += 1;
                            if !config.quiet {
                                println!("{} {}", "wrote".green(), path.display());
                            }
                        }
                        FileStatus::Unchanged => debug!("{} is up to date", path.display()),
                        FileStatus::Stale => stale.push(path),
                    }
                }
            }
        }

        if !stale.is_empty() {
            for path in &stale {
                eprintln!("{} {}", "out of date".red(), path.display());
            }
            anyhow::bail!("{} aspect file(s) are out of date", stale.len());
        }
        anyhow::ensure!(failures == 0, "{failures} aspect(s) could not be generated");

        if self.output.is_some() && !config.quiet {
            println!("{} {} aspect(s) written, {} total", "✓".green(), written, computed.len());
        }
        Ok(())
    }
}

async fn sync_file(path: &Path, rendered: &str, check: bool) -> Result<FileStatus> {
    let current = fs::read_to_string(path).await.ok();
    if current.as_deref() == Some(rendered) {
        return Ok(FileStatus::Unchanged);
    }
    if check {
        return Ok(FileStatus::Stale);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, rendered).await.with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(FileStatus::Written)
}
