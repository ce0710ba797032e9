//! The metadata dependency and regeneration engine.
//!
//! Every piece of derived information about a user type, from its parsed member view to
//! the inter-type declarations generated for it, is a metadata item addressed by a
//! [`MetadataId`]. Items are computed on demand by the [`MetadataProvider`] registered
//! for the identifier's tag, cached, and marked stale when anything they read changes.
//!
//! # Components
//!
//! - [`identifier`] - `MID:` identifier strings and provider tags
//! - [`item`] - immutable computed items and their payloads
//! - [`cache`] - most recent item per identifier, with optional LRU bound
//! - [`registry`] - the dependency graph and change notification
//! - [`provider`] - the provider contract and the computation context
//! - [`triggers`] - marker annotation -> provider tag table
//! - [`service`] - the orchestrator owning all of the above
//! - [`pipeline`] - serialized application of concurrent change events
//!
//! # Lifecycle
//!
//! ```text
//! Unknown --get--> Computing --> Valid | Invalid
//! Valid --upstream changed--> Invalid --get--> Computing --> Valid | Invalid
//! any --evict--> Unknown
//! ```

pub mod cache;
pub mod identifier;
pub mod item;
pub mod pipeline;
pub mod provider;
pub mod registry;
pub mod service;
pub mod triggers;

pub use cache::{CacheStats, MetadataCache};
pub use identifier::{MID_PREFIX, MetadataId, ProviderTag};
pub use item::{MetadataItem, Payload};
pub use pipeline::{ChangeEvent, ChangePipeline, PipelineReport, SharedMetadataService};
pub use provider::{MetadataContext, MetadataProvider, NotifyAction};
pub use registry::{DependencyRegistry, NotificationListener, NotifySummary};
pub use service::{ItemState, MetadataService};
pub use triggers::TriggerTable;
