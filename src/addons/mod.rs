//! Built-in metadata providers.
//!
//! - [`javabean`] - accessors and mutators for `@RooJavaBean` types
//! - [`dod`] - data-on-demand test fixtures for `@RooDataOnDemand` types
//!
//! Both are [`ItdProvider`]s and so depend, at class level, on the physical type layer.
//! [`register_builtin`] wires the physical type provider and both addons into a service.
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::addons::register_builtin;
//! use itdgen::config::EngineConfig;
//! use itdgen::metadata::MetadataService;
//! use itdgen::physical::TypeRepository;
//!
//! let repository = TypeRepository::shared();
//! let mut service = MetadataService::new();
//! register_builtin(&mut service, repository, &EngineConfig::default())?;
//! assert_eq!(service.provider_tags().len(), 3);
//! # Ok::<(), itdgen::core::MetadataError>(())
//! ```

pub mod dod;
pub mod javabean;

use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::core::MetadataError;
use crate::itd::ItdProvider;
use crate::metadata::MetadataService;
use crate::physical::{PhysicalTypeProvider, SharedTypeRepository};

pub use dod::{DATA_ON_DEMAND, DataOnDemandGenerator, data_on_demand_tag};
pub use javabean::{JAVA_BEAN, JavaBeanGenerator, java_bean_tag};

/// Register the physical type provider over `repository` plus the built-in addons.
///
/// Providers already registered under the same tags are replaced.
pub fn register_builtin(
    service: &mut MetadataService,
    repository: SharedTypeRepository,
    config: &EngineConfig,
) -> Result<(), MetadataError> {
    service.register_provider(Arc::new(PhysicalTypeProvider::new(repository)))?;
    service.register_provider(Arc::new(ItdProvider::with_infix(
        JavaBeanGenerator,
        config.aspect_infix.as_str(),
    )))?;
    service.register_provider(Arc::new(ItdProvider::with_infix(
        DataOnDemandGenerator,
        config.aspect_infix.as_str(),
    )))?;
    debug!("Registered built-in providers with aspect infix {}", config.aspect_infix);
    Ok(())
}
