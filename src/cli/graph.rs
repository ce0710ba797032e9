//! Print the dependency tree below each physical type.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::CliConfig;
use super::common::Workspace;
use crate::physical::physical_type_id;

/// Command to display metadata dependencies.
#[derive(Args, Debug)]
pub struct GraphCommand {
    /// Only show the tree of this fully qualified type
    #[arg(long = "type", value_name = "FQN")]
    type_name: Option<String>,
}

impl GraphCommand {
    /// Compute the selected types, then print one tree per physical type identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be loaded or the type is not declared.
    pub async fn execute(self, config: &CliConfig, project_path: &Path) -> Result<()> {
        let workspace = Workspace::load(config, project_path).await?;
        workspace.compute(self.type_name.as_deref()).await?;

        let service = workspace.service.lock().await;
        let registry = service.dependencies();
        for details in workspace.project.select(self.type_name.as_deref()) {
            let root = physical_type_id(&details.name, &details.path);
            print!("{}", registry.to_tree_string(&root));
        }

        if !config.quiet {
            let stats = service.stats();
            println!(
                "{} {} edge(s), {} computation(s), {:.1}% cache hit rate",
                "graph".cyan(),
                registry.edge_count(),
                stats.computations,
                stats.hit_rate()
            );
        }
        Ok(())
    }
}
