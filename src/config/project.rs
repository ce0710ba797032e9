//! The project file (`itdgen.toml`).
//!
//! A project file describes the physical types the engine generates for and may
//! override engine settings from the global configuration:
//!
//! ```toml
//! [engine]
//! aspect_infix = "_Roo_"
//!
//! [[types]]
//! name = "com.example.Customer"
//! path = "SRC_MAIN_JAVA"             # default
//! category = "class"                 # class | interface | enum
//! annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]
//!
//! [[types.fields]]
//! name = "name"
//! type = "java.lang.String"
//! annotations = [{ type = "javax.validation.constraints.Size", attributes = { max = 30 } }]
//! ```
//!
//! Type names, member names and paths are validated while parsing, so a malformed
//! symbol is reported with the file it came from.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::global::EngineConfig;
use super::parser::parse_config;
use crate::core::MetadataError;
use crate::model::TypeDetails;
use crate::physical::TypeRepository;

/// Engine settings a project may override. Unset fields fall back to the global file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_infix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_buffer: Option<usize>,
}

impl EngineOverrides {
    /// `base` with every set override applied.
    pub fn apply(&self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            cache_capacity: self.cache_capacity.or(base.cache_capacity),
            aspect_infix: self.aspect_infix.clone().unwrap_or_else(|| base.aspect_infix.clone()),
            pipeline_buffer: self.pipeline_buffer.unwrap_or(base.pipeline_buffer),
        }
    }
}

/// A parsed `itdgen.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub engine: EngineOverrides,
    #[serde(default)]
    pub types: Vec<TypeDetails>,
}

impl ProjectFile {
    /// Read, parse and validate a project file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains malformed TOML or symbols,
    /// or fails [`validate`](Self::validate).
    pub async fn load(path: &Path) -> Result<Self> {
        let project: Self = parse_config(path).await?;
        project.validate().with_context(|| format!("Invalid project file: {}", path.display()))?;
        Ok(project)
    }

    /// Check for duplicate type names and unusable engine overrides.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), MetadataError> {
        let mut seen = BTreeSet::new();
        for details in &self.types {
            if !seen.insert(&details.name) {
                return Err(MetadataError::ConfigError {
                    message: format!("type {} is declared more than once", details.name),
                });
            }
        }
        self.engine.apply(&EngineConfig::default()).validate()
    }

    /// The effective engine settings on top of `global`.
    pub fn engine_config(&self, global: &EngineConfig) -> EngineConfig {
        self.engine.apply(global)
    }

    /// The declared types, keyed by name.
    pub fn repository(&self) -> TypeRepository {
        self.types.iter().cloned().collect()
    }

    /// Declared types whose fully qualified name is `name`, or all types when `None`.
    pub fn select<'a>(&'a self, name: Option<&'a str>) -> impl Iterator<Item = &'a TypeDetails> + 'a {
        self.types
            .iter()
            .filter(move |details| name.is_none_or(|n| details.name.fully_qualified_name() == n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config_str;
    use crate::model::{AnnotationAttributeValue, JavaType, LogicalPath};
    use crate::test_utils::ProjectFixture;

    fn parse(content: &str) -> Result<ProjectFile> {
        parse_config_str(content, Path::new("itdgen.toml"))
    }

    #[test]
    fn test_parses_customer_fixture() {
        let project = parse(&ProjectFixture::customer().content).unwrap();
        project.validate().unwrap();
        assert_eq!(project.types.len(), 2);

        let customer = &project.types[0];
        assert_eq!(customer.path, LogicalPath::src_main_java());
        assert_eq!(customer.fields.len(), 3);
        let size = customer.fields[1]
            .annotation(&JavaType::new("javax.validation.constraints.Size"))
            .unwrap();
        assert_eq!(size.attribute("max"), Some(&AnnotationAttributeValue::Integer(30)));

        let dod = &project.types[1];
        assert_eq!(dod.path, LogicalPath::src_test_java());
        assert_eq!(
            dod.annotations[0].attribute("entity").and_then(AnnotationAttributeValue::as_class),
            Some(&JavaType::new("com.example.Customer"))
        );
        assert_eq!(project.repository().len(), 2);
    }

    #[test]
    fn test_malformed_type_name_is_reported() {
        let err = parse(&ProjectFixture::invalid_type_name().content).unwrap_err();
        assert!(format!("{err:#}").contains("2Bad"));
    }

    #[test]
    fn test_duplicate_types_rejected() {
        let project = parse("[[types]]\nname = \"a.B\"\n\n[[types]]\nname = \"a.B\"\n").unwrap();
        assert!(project.validate().unwrap_err().to_string().contains("a.B"));
    }

    #[test]
    fn test_engine_overrides_apply_over_global() {
        let project = parse(&ProjectFixture::service().content).unwrap();
        let global = EngineConfig {
            cache_capacity: Some(10),
            aspect_infix: "_Gen_".to_string(),
            ..EngineConfig::default()
        };
        let effective = project.engine_config(&global);
        assert_eq!(effective.aspect_infix, "_Roo_");
        assert_eq!(effective.cache_capacity, Some(10));
    }

    #[test]
    fn test_select_by_name() {
        let project = parse(&ProjectFixture::customer().content).unwrap();
        assert_eq!(project.select(None).count(), 2);
        assert_eq!(project.select(Some("com.example.Customer")).count(), 1);
        assert_eq!(project.select(Some("com.example.Missing")).count(), 0);
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = ProjectFixture::customer().write_to(temp.path()).unwrap();
        let project = ProjectFile::load(&path).await.unwrap();
        assert_eq!(project.types[0].name.simple_name(), "Customer");
    }
}
