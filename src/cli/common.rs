//! Engine setup shared by the commands that work on a project.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CliConfig;
use crate::addons::register_builtin;
use crate::config::{EngineConfig, GlobalConfig, ProjectFile};
use crate::core::MetadataError;
use crate::metadata::{ChangeEvent, ChangePipeline, MetadataId, MetadataItem, MetadataService, SharedMetadataService};
use crate::physical::{SharedTypeRepository, TypeRepository};

/// The outcome of computing one trigger-matched identifier.
#[derive(Debug)]
pub struct Computed {
    pub id: MetadataId,
    pub result: Result<Arc<MetadataItem>, MetadataError>,
}

/// A loaded project with a running engine.
pub struct Workspace {
    pub project: ProjectFile,
    pub engine: EngineConfig,
    pub service: SharedMetadataService,
    pub repository: SharedTypeRepository,
}

impl Workspace {
    /// Load configuration and the project file, register the built-in providers and
    /// feed every declared type through the change pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded or the providers cannot be
    /// registered.
    pub async fn load(config: &CliConfig, project_path: &Path) -> Result<Self> {
        let global = GlobalConfig::load_with_optional(config.config_path.clone()).await?;
        let project = ProjectFile::load(project_path).await?;
        let engine = project.engine_config(&global.engine);
        engine.validate().context("Invalid engine settings")?;

        let repository = TypeRepository::shared();
        let mut service = MetadataService::with_cache_capacity(engine.cache_capacity);
        register_builtin(&mut service, Arc::clone(&repository), &engine)?;
        let service: SharedMetadataService = Arc::new(Mutex::new(service));

        let pipeline =
            ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), engine.pipeline_buffer);
        for details in &project.types {
            pipeline.submit(ChangeEvent::TypeChanged(details.clone())).await?;
        }
        let report = pipeline.finish().await?;
        for failure in &report.failures {
            warn!("{failure}");
        }
        debug!(
            "Loaded {} type(s) from {}",
            report.events_applied,
            project_path.display()
        );

        Ok(Self {
            project,
            engine,
            service,
            repository,
        })
    }

    /// Compute every trigger-matched identifier of the selected types, in declaration
    /// order of the types and tag order within a type.
    ///
    /// # Errors
    ///
    /// Returns an error if `type_name` names no declared type.
    pub async fn compute(&self, type_name: Option<&str>) -> Result<Vec<Computed>> {
        let selected: Vec<_> = self.project.select(type_name).collect();
        if let Some(name) = type_name {
            anyhow::ensure!(!selected.is_empty(), "Type {name} is not declared in the project");
        }

        let mut service = self.service.lock().await;
        let mut computed = Vec::new();
        for details in selected {
            for id in service.matching_identifiers(details) {
                let result = service.get(&id);
                if let Err(e) = &result {
                    warn!("{id}: {e}");
                }
                computed.push(Computed {
                    id,
                    result,
                });
            }
        }
        Ok(computed)
    }
}
