//! The metadata provider contract.
//!
//! A provider computes one kind of metadata, named by its [`ProviderTag`]. The
//! [`MetadataService`] dispatches every `get` to the provider registered for the
//! identifier's tag and hands it a [`MetadataContext`] through which all upstream
//! reads must go, so the dependency registry always reflects what a computation
//! actually read.

use std::sync::Arc;

use super::identifier::{MetadataId, ProviderTag};
use super::item::MetadataItem;
use super::service::MetadataService;
use crate::core::MetadataError;
use crate::model::JavaType;

/// What a provider wants done when one of its upstreams changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyAction {
    /// Mark the cached item for this identifier stale and keep propagating from it.
    Invalidate(MetadataId),
    /// The change does not affect this provider.
    Ignore,
}

/// A pluggable computation for one kind of metadata.
pub trait MetadataProvider: Send + Sync {
    /// The tag of the identifiers this provider computes. Constant for a provider.
    fn provides_type(&self) -> &ProviderTag;

    /// Compute the item for `id`.
    ///
    /// Must be deterministic given identical upstream state, and must read upstream
    /// metadata only through `ctx`. A missing or invalid upstream should produce an
    /// invalid item rather than an error; errors other than
    /// [`MetadataError::CyclicDependency`] and [`MetadataError::MalformedIdentifier`]
    /// are turned into invalid items by the service.
    fn get(
        &self,
        id: &MetadataId,
        ctx: &mut MetadataContext<'_>,
    ) -> Result<MetadataItem, MetadataError>;

    /// Marker annotation types that make a physical type relevant to this provider.
    fn triggers(&self) -> Vec<JavaType> {
        Vec::new()
    }

    /// Provider kinds whose change to any instance must reach this provider.
    fn class_level_upstreams(&self) -> Vec<ProviderTag> {
        Vec::new()
    }

    /// This provider's identifier for the target and path of `upstream`.
    fn local_id_for(&self, upstream: &MetadataId) -> Option<MetadataId> {
        upstream.with_tag(self.provides_type())
    }

    /// React to a change of `upstream` reaching `downstream`.
    ///
    /// The default invalidates `downstream`, resolving a class-level downstream to
    /// [`local_id_for`](Self::local_id_for) the changed upstream.
    fn notify(&self, upstream: &MetadataId, downstream: &MetadataId) -> NotifyAction {
        if downstream.is_class_level() {
            match self.local_id_for(upstream) {
                Some(local) => NotifyAction::Invalidate(local),
                None => NotifyAction::Ignore,
            }
        } else {
            NotifyAction::Invalidate(downstream.clone())
        }
    }
}

/// Access to upstream metadata during one computation.
///
/// Every [`get`](Self::get) registers the dependency edge before resolving the
/// upstream and remembers it, so edges no longer read can be pruned afterwards.
pub struct MetadataContext<'a> {
    service: &'a mut MetadataService,
    downstream: MetadataId,
    reads: Vec<MetadataId>,
}

impl<'a> MetadataContext<'a> {
    pub(crate) fn new(service: &'a mut MetadataService, downstream: MetadataId) -> Self {
        Self {
            service,
            downstream,
            reads: Vec::new(),
        }
    }

    /// The identifier being computed.
    pub fn downstream(&self) -> &MetadataId {
        &self.downstream
    }

    /// Resolve `upstream`, recording that the current computation depends on it.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if `upstream` is already being computed
    /// further up the call chain, [`MetadataError::MalformedIdentifier`] for a
    /// class-level `upstream`.
    pub fn get(&mut self, upstream: &MetadataId) -> Result<Arc<MetadataItem>, MetadataError> {
        if !self.reads.contains(upstream) {
            self.reads.push(upstream.clone());
        }
        self.service.resolve_upstream(&self.downstream, upstream)
    }

    /// Like [`get`](Self::get) but yields `None` for an invalid upstream.
    pub fn get_valid(
        &mut self,
        upstream: &MetadataId,
    ) -> Result<Option<Arc<MetadataItem>>, MetadataError> {
        let item = self.get(upstream)?;
        Ok(item.is_valid().then_some(item))
    }

    /// Resolve `upstream`, failing with [`MetadataError::MissingUpstream`] if it is invalid.
    pub fn require(&mut self, upstream: &MetadataId) -> Result<Arc<MetadataItem>, MetadataError> {
        match self.get_valid(upstream)? {
            Some(item) => Ok(item),
            None => Err(MetadataError::MissingUpstream {
                downstream: self.downstream.to_string(),
                upstream: upstream.to_string(),
            }),
        }
    }

    pub(crate) fn into_reads(self) -> Vec<MetadataId> {
        self.reads
    }
}
