//! itdgen - a demand-driven metadata engine for inter-type declarations
//!
//! itdgen synthesizes Java members (fields, methods, type annotations) into aspect files
//! that sit next to user-owned types, so the user's sources are never rewritten. The
//! interesting part is the engine underneath: every generated artifact is a metadata
//! item keyed by an identifier, computed lazily from upstream items, cached, and
//! invalidated exactly when something it read changes.
//!
//! # Architecture Overview
//!
//! ```text
//!   itdgen.toml ──► physical types ──► PhysicalType items
//!                                          │ (class-level edge)
//!                                          ▼
//!                                   JavaBean items ──► DataOnDemand items ──► *.aj
//! ```
//!
//! - Identifiers look like `MID:<tag>#<PATH>?<fully.qualified.Type>`; `MID:<tag>` is the
//!   class-level identifier standing for every instance of that tag.
//! - A provider computing an item reads its upstreams through a
//!   [`metadata::MetadataContext`], which records the edges in the dependency registry.
//! - A change notification walks the registry breadth-first, evicting each reached
//!   item once; a cycle is detected before anything is invalidated.
//! - Rendering is a pure function of the item, so unchanged input gives byte-identical
//!   output.
//!
//! # Core Modules
//!
//! - [`model`] - Java type, symbol, member and logical path value objects
//! - [`metadata`] - identifiers, items, cache, dependency registry, service and the
//!   change pipeline
//! - [`physical`] - the physical type repository and its provider
//! - [`itd`] - ITD builders, rendering and the generator-backed provider
//! - [`addons`] - the built-in `JavaBean` and `DataOnDemand` generators
//! - [`config`] - global configuration and the project file
//! - [`cli`] - the `itdgen` command line
//! - [`core`] - error types and user-facing error reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use itdgen::addons::{java_bean_tag, register_builtin};
//! use itdgen::config::EngineConfig;
//! use itdgen::metadata::{MetadataId, MetadataService};
//! use itdgen::model::{AnnotationMetadata, JavaType, LogicalPath, TypeDetails, well_known};
//! use itdgen::physical::TypeRepository;
//!
//! # fn example() -> Result<(), itdgen::core::MetadataError> {
//! let customer = TypeDetails::class(JavaType::new("com.example.Customer"), LogicalPath::src_main_java())
//!     .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ROO_JAVA_BEAN)));
//! let repository = TypeRepository::shared();
//! repository.write().unwrap().upsert(customer);
//!
//! let mut service = MetadataService::new();
//! register_builtin(&mut service, repository, &EngineConfig::default())?;
//!
//! let id = MetadataId::create(java_bean_tag(), &JavaType::new("com.example.Customer"), &LogicalPath::src_main_java());
//! let item = service.get(&id)?;
//! if let Some(itd) = item.itd() {
//!     println!("{}", itd.render());
//! }
//! # Ok(())
//! # }
//! ```

// Engine
pub mod core;
pub mod metadata;
pub mod model;
pub mod physical;

// Generation
pub mod addons;
pub mod itd;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
