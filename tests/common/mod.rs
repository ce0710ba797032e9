//! Shared helpers for integration tests.

use anyhow::Result;
use assert_cmd::Command;
use itdgen::addons::register_builtin;
use itdgen::config::EngineConfig;
use itdgen::metadata::{MetadataId, MetadataService};
use itdgen::model::{JavaType, LogicalPath, TypeDetails};
use itdgen::physical::{SharedTypeRepository, TypeRepository, physical_type_id};
use itdgen::test_utils::ProjectFixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A metadata service over a repository holding `types`, with the built-in providers.
pub struct Engine {
    pub service: MetadataService,
    pub repository: SharedTypeRepository,
}

impl Engine {
    pub fn new(types: impl IntoIterator<Item = TypeDetails>) -> Result<Self> {
        let repository = TypeRepository::shared();
        {
            let mut guard = repository.write().map_err(|_| anyhow::anyhow!("poisoned"))?;
            for details in types {
                guard.upsert(details);
            }
        }
        let mut service = MetadataService::new();
        register_builtin(&mut service, Arc::clone(&repository), &EngineConfig::default())?;
        Ok(Self {
            service,
            repository,
        })
    }

    /// Replace a type and notify its physical identifier.
    pub fn change(&mut self, details: TypeDetails) -> Result<()> {
        let id = physical_type_id(&details.name, &details.path);
        self.repository.write().map_err(|_| anyhow::anyhow!("poisoned"))?.upsert(details);
        self.service.notify_changed(&id)?;
        Ok(())
    }
}

/// `MID:<tag>#<path>?<type_name>`.
pub fn id_at(tag: &str, type_name: &str, path: LogicalPath) -> MetadataId {
    MetadataId::create(&tag.parse().expect("tag"), &JavaType::new(type_name), &path)
}

/// A temporary directory holding a project file and an isolated global config path.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new(fixture: &ProjectFixture) -> Result<Self> {
        let dir = TempDir::new()?;
        fixture.write_to(dir.path())?;
        Ok(Self {
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn project_file(&self) -> PathBuf {
        self.dir.path().join("itdgen.toml")
    }

    pub fn write_project(&self, content: &str) -> Result<()> {
        std::fs::write(self.project_file(), content)?;
        Ok(())
    }

    /// `itdgen` run inside the project directory with the global config isolated.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("itdgen").expect("itdgen binary");
        cmd.current_dir(self.path())
            .env("ITDGEN_CONFIG", self.path().join("global.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}
