//! The metadata service: owner of providers, cache, registry and triggers.
//!
//! All computation is demand driven. [`MetadataService::get`] answers from the cache when
//! the cached item is fresh and valid, and otherwise dispatches to the provider
//! registered for the identifier's tag. Providers read upstream metadata through a
//! [`MetadataContext`], which recursively calls back into the service and records the
//! dependency edge on the way.
//!
//! A change is announced with [`MetadataService::notify_changed`]. That only marks
//! dependents stale; nothing is recomputed until somebody asks for it again.
//!
//! # Cycles
//!
//! Identifiers currently being computed sit on an explicit stack. Asking for one of
//! them again fails fast with [`MetadataError::CyclicDependency`]; the closing edge is
//! never registered, every frame of the failing chain caches an invalid item, and the
//! error reaches the outermost caller. The service stays usable afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::metadata::{MetadataId, MetadataService};
//!
//! # fn example() -> Result<(), itdgen::core::MetadataError> {
//! let mut service = MetadataService::new();
//! // providers are registered here, see `itdgen::addons::register_builtin`
//! let id: MetadataId = "MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer".parse()?;
//! let item = service.get(&id)?;
//! println!("{} valid: {}", item.id(), item.is_valid());
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use strsim::levenshtein;
use tracing::{debug, trace, warn};

use super::cache::{CacheStats, MetadataCache};
use super::identifier::{MetadataId, ProviderTag};
use super::item::MetadataItem;
use super::provider::{MetadataContext, MetadataProvider, NotifyAction};
use super::registry::{DependencyRegistry, NotificationListener, NotifySummary};
use super::triggers::TriggerTable;
use crate::core::MetadataError;
use crate::model::TypeDetails;

/// Percentage of the tag length a suggestion may differ by.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Lifecycle state of one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemState {
    /// Never computed, or evicted.
    Unknown,
    /// On the computing stack.
    Computing,
    /// Cached, fresh and valid.
    Valid,
    /// Cached but invalid, or stale after an upstream change.
    Invalid,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Computing => "computing",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// Demand-driven metadata engine.
pub struct MetadataService {
    providers: BTreeMap<ProviderTag, Arc<dyn MetadataProvider>>,
    triggers: TriggerTable,
    registry: DependencyRegistry,
    cache: MetadataCache,
    computing: Vec<MetadataId>,
    computing_set: HashSet<MetadataId>,
}

impl Default for MetadataService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataService")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("triggers", &self.triggers)
            .field("registry", &self.registry)
            .field("cached", &self.cache.len())
            .field("computing", &self.computing)
            .finish()
    }
}

impl MetadataService {
    /// Create a service with an unbounded cache and no providers.
    pub fn new() -> Self {
        Self::with_cache_capacity(None)
    }

    /// Create a service whose cache holds at most `capacity` items.
    pub fn with_cache_capacity(capacity: Option<usize>) -> Self {
        let cache = match capacity {
            Some(capacity) => MetadataCache::with_capacity(capacity),
            None => MetadataCache::new(),
        };
        Self {
            providers: BTreeMap::new(),
            triggers: TriggerTable::new(),
            registry: DependencyRegistry::new(),
            cache,
            computing: Vec::new(),
            computing_set: HashSet::new(),
        }
    }

    /// Get the item for `id`, computing it if needed.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MalformedIdentifier`] for class-level identifiers and
    /// [`MetadataError::CyclicDependency`] if computing `id` leads back to itself.
    /// Every other failure is reported as an invalid item.
    pub fn get(&mut self, id: &MetadataId) -> Result<Arc<MetadataItem>, MetadataError> {
        self.get_with(id, false)
    }

    /// Get the item for `id`; with `evict_cache` the cached item is discarded first.
    pub fn get_with(
        &mut self,
        id: &MetadataId,
        evict_cache: bool,
    ) -> Result<Arc<MetadataItem>, MetadataError> {
        if id.is_class_level() {
            return Err(MetadataError::malformed(
                id.to_string(),
                "class-level identifiers cannot be computed",
            ));
        }
        if self.computing_set.contains(id) {
            return Err(self.cycle_error(id));
        }

        if evict_cache {
            self.cache.remove(id);
        }
        if let Some(item) = self.cache.fresh(id) {
            trace!("Metadata cache hit for {}", id);
            return Ok(item);
        }

        let tag = id.provider_tag();
        let Some(provider) = self.providers.get(tag).cloned() else {
            let error = MetadataError::ProviderNotFound {
                tag: tag.to_string(),
            };
            match self.suggest_provider(tag) {
                Some(suggestion) => {
                    warn!("{} for {} (did you mean '{}'?)", error, id, suggestion);
                }
                None => warn!("{} for {}", error, id),
            }
            return Ok(self.store(MetadataItem::from_error(id.clone(), &error)));
        };

        self.compute(id, provider.as_ref())
    }

    fn compute(
        &mut self,
        id: &MetadataId,
        provider: &dyn MetadataProvider,
    ) -> Result<Arc<MetadataItem>, MetadataError> {
        debug!("Computing metadata {}", id);
        self.computing.push(id.clone());
        self.computing_set.insert(id.clone());
        self.cache.record_computation();
        let previous_upstreams = self.registry.upstream_of(id);

        let mut ctx = MetadataContext::new(self, id.clone());
        let result = provider.get(id, &mut ctx);
        let reads = ctx.into_reads();

        self.computing.pop();
        self.computing_set.remove(id);

        for upstream in previous_upstreams.iter().filter(|u| !reads.contains(u)) {
            trace!("Pruning stale dependency {} -> {}", upstream, id);
            self.registry.deregister_dependency(upstream, id);
        }

        match result {
            Ok(item) if item.id() == id => {
                if let Some(reason) = item.invalid_reason() {
                    debug!("Metadata {} is invalid: {}", id, reason);
                }
                Ok(self.store(item))
            }
            Ok(item) => {
                warn!("Provider for {} returned an item for {}", id, item.id());
                let reason = format!("provider returned an item for {}", item.id());
                Ok(self.store(MetadataItem::invalid(id.clone(), reason)))
            }
            Err(error) if error.is_fatal_to_computation() => {
                warn!("Computation of {} failed: {}", id, error);
                self.store(MetadataItem::from_error(id.clone(), &error));
                self.invalidate_dependents(id);
                Err(error)
            }
            Err(error) => {
                debug!("Metadata {} is invalid: {}", id, error);
                Ok(self.store(MetadataItem::from_error(id.clone(), &error)))
            }
        }
    }

    /// Mark everything depending on `id` stale, leaving `id` itself as cached.
    fn invalidate_dependents(&mut self, id: &MetadataId) {
        let mut invalidator = Invalidator {
            providers: &self.providers,
            cache: &mut self.cache,
        };
        match self.registry.notify(id, &mut invalidator) {
            Ok(summary) => {
                debug!("Failure of {} invalidated {} item(s)", id, summary.invalidated.len());
            }
            Err(e) => warn!("Could not notify dependents of {}: {}", id, e),
        }
    }

    /// Resolve `upstream` on behalf of the computation of `downstream`.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if `upstream` is being computed or already
    /// depends on `downstream`.
    pub(crate) fn resolve_upstream(
        &mut self,
        downstream: &MetadataId,
        upstream: &MetadataId,
    ) -> Result<Arc<MetadataItem>, MetadataError> {
        if upstream.is_class_level() {
            return Err(MetadataError::malformed(
                upstream.to_string(),
                "class-level identifiers cannot be read as upstream metadata",
            ));
        }
        if self.computing_set.contains(upstream) {
            return Err(self.cycle_error(upstream));
        }
        self.registry.register_dependency(upstream, downstream)?;
        self.get(upstream)
    }

    fn cycle_error(&self, id: &MetadataId) -> MetadataError {
        let start = self.computing.iter().position(|c| c == id).unwrap_or(0);
        let mut cycle: Vec<String> = self.computing[start..].iter().map(ToString::to_string).collect();
        cycle.push(id.to_string());
        warn!("Cyclic metadata dependency detected: {}", cycle.join(" → "));
        MetadataError::CyclicDependency {
            cycle,
        }
    }

    fn store(&mut self, item: MetadataItem) -> Arc<MetadataItem> {
        let item = Arc::new(item);
        self.cache.insert(Arc::clone(&item));
        item
    }

    fn suggest_provider(&self, tag: &ProviderTag) -> Option<&ProviderTag> {
        let target = tag.as_str();
        self.providers
            .keys()
            .map(|candidate| (candidate, levenshtein(target, candidate.as_str())))
            .filter(|(_, distance)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate)
    }

    /// Announce that `upstream` changed.
    ///
    /// Marks `upstream` itself stale and everything depending on it, transitively.
    /// Nothing is recomputed here.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if the registry contains a cycle reachable
    /// from `upstream`; in that case nothing is invalidated.
    pub fn notify_changed(&mut self, upstream: &MetadataId) -> Result<NotifySummary, MetadataError> {
        let mut invalidator = Invalidator {
            providers: &self.providers,
            cache: &mut self.cache,
        };
        let summary = self.registry.notify(upstream, &mut invalidator)?;
        if !upstream.is_class_level() {
            self.cache.mark_stale(upstream);
        }
        debug!("Change of {} invalidated {} item(s)", upstream, summary.invalidated.len());
        Ok(summary)
    }

    /// Drop the cached item for `id`. Returns `true` if there was one.
    pub fn evict(&mut self, id: &MetadataId) -> bool {
        self.cache.remove(id).is_some()
    }

    /// Drop every cached item. Dependency edges are kept.
    pub fn evict_all(&mut self) {
        self.cache.clear();
    }

    /// Register `provider`, replacing and returning any provider with the same tag.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if the provider lists its own tag as a
    /// class-level upstream, or if a class-level upstream already depends on this tag.
    /// The service is left unchanged in that case.
    pub fn register_provider(
        &mut self,
        provider: Arc<dyn MetadataProvider>,
    ) -> Result<Option<Arc<dyn MetadataProvider>>, MetadataError> {
        let tag = provider.provides_type().clone();
        let class_id = MetadataId::class_level(&tag);
        let upstreams = provider.class_level_upstreams();
        if upstreams.contains(&tag) {
            return Err(MetadataError::CyclicDependency {
                cycle: vec![class_id.to_string(), class_id.to_string()],
            });
        }

        for upstream in &upstreams {
            self.registry.check_dependency(&MetadataId::class_level(upstream), &class_id)?;
        }

        let previous = self.deactivate(&tag);
        self.triggers.register(&tag, &provider.triggers());
        for upstream in &upstreams {
            self.registry.register_dependency(&MetadataId::class_level(upstream), &class_id)?;
        }
        debug!("Registered metadata provider {}", tag);
        self.providers.insert(tag, provider);
        Ok(previous)
    }

    /// Remove the provider for `tag`, evicting its items and notifying their dependents.
    pub fn deregister_provider(&mut self, tag: &ProviderTag) -> Option<Arc<dyn MetadataProvider>> {
        self.deactivate(tag)
    }

    fn deactivate(&mut self, tag: &ProviderTag) -> Option<Arc<dyn MetadataProvider>> {
        let previous = self.providers.remove(tag)?;
        let class_id = MetadataId::class_level(tag);
        for upstream in previous.class_level_upstreams() {
            self.registry.deregister_dependency(&MetadataId::class_level(&upstream), &class_id);
        }
        self.triggers.remove(tag);

        let owned: Vec<MetadataId> = self
            .registry
            .identifiers()
            .into_iter()
            .filter(|id| id.provider_tag() == tag && !id.is_class_level())
            .collect();
        for id in &owned {
            if let Err(e) = self.notify_changed(id) {
                warn!("Could not notify dependents of {}: {}", id, e);
            }
            self.registry.deregister_dependencies(id);
        }
        let evicted = self.cache.remove_tag(tag);
        debug!("Deactivated metadata provider {} ({} cached item(s) evicted)", tag, evicted);
        Some(previous)
    }

    /// The provider registered for `tag`.
    pub fn provider(&self, tag: &ProviderTag) -> Option<Arc<dyn MetadataProvider>> {
        self.providers.get(tag).cloned()
    }

    /// Registered provider tags, sorted.
    pub fn provider_tags(&self) -> Vec<&ProviderTag> {
        self.providers.keys().collect()
    }

    /// Identifiers to create for `details`, one per provider it triggers.
    pub fn matching_identifiers(&self, details: &TypeDetails) -> Vec<MetadataId> {
        let annotations = details.annotations.iter().map(|a| &a.annotation_type);
        self.triggers
            .matching_tags(annotations)
            .into_iter()
            .map(|tag| MetadataId::create(tag, &details.name, &details.path))
            .collect()
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    /// Current lifecycle state of `id`.
    pub fn state(&self, id: &MetadataId) -> ItemState {
        if self.computing_set.contains(id) {
            return ItemState::Computing;
        }
        match self.cache.peek(id) {
            None => ItemState::Unknown,
            Some(item) if item.is_valid() && !self.cache.is_stale(id) => ItemState::Valid,
            Some(_) => ItemState::Invalid,
        }
    }

    /// The cached item for `id` without computing or touching statistics.
    pub fn cached(&self, id: &MetadataId) -> Option<Arc<MetadataItem>> {
        self.cache.peek(id).cloned()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn dependencies(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Direct access to the registry, e.g. to declare edges no provider reads.
    pub fn dependencies_mut(&mut self) -> &mut DependencyRegistry {
        &mut self.registry
    }
}

/// Listener marking notified items stale in the cache.
struct Invalidator<'a> {
    providers: &'a BTreeMap<ProviderTag, Arc<dyn MetadataProvider>>,
    cache: &'a mut MetadataCache,
}

impl NotificationListener for Invalidator<'_> {
    fn on_notify(
        &mut self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Option<MetadataId> {
        let action = match self.providers.get(downstream.provider_tag()) {
            Some(provider) => provider.notify(upstream, downstream),
            None if downstream.is_class_level() => NotifyAction::Ignore,
            None => NotifyAction::Invalidate(downstream.clone()),
        };
        match action {
            NotifyAction::Invalidate(id) => {
                if self.cache.mark_stale(&id) {
                    trace!("Invalidated {} after change of {}", id, upstream);
                }
                Some(id)
            }
            NotifyAction::Ignore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{CountingProvider, mid};

    fn service_with(providers: Vec<CountingProvider>) -> MetadataService {
        let mut service = MetadataService::new();
        for provider in providers {
            service.register_provider(Arc::new(provider)).unwrap();
        }
        service
    }

    #[test]
    fn test_second_get_is_a_cache_hit() {
        let a = CountingProvider::new("A", &[]);
        let count = a.counter();
        let mut service = service_with(vec![a]);

        let first = service.get(&mid("A", "x.Y")).unwrap();
        let second = service.get(&mid("A", "x.Y")).unwrap();
        assert_eq!(first, second);
        assert_eq!(count.get(), 1);
        assert_eq!(service.stats().hits, 1);
        assert_eq!(service.state(&mid("A", "x.Y")), ItemState::Valid);
    }

    #[test]
    fn test_evict_cache_forces_recompute() {
        let a = CountingProvider::new("A", &[]);
        let count = a.counter();
        let mut service = service_with(vec![a]);

        service.get(&mid("A", "x.Y")).unwrap();
        service.get_with(&mid("A", "x.Y"), true).unwrap();
        assert_eq!(count.get(), 2);

        assert!(service.evict(&mid("A", "x.Y")));
        assert_eq!(service.state(&mid("A", "x.Y")), ItemState::Unknown);
    }

    #[test]
    fn test_class_level_get_is_malformed() {
        let mut service = MetadataService::new();
        let err = service.get(&"MID:A".parse().unwrap()).unwrap_err();
        assert!(matches!(err, MetadataError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_unknown_provider_yields_invalid_item() {
        let mut service = service_with(vec![CountingProvider::new("JavaBean", &[])]);
        let item = service.get(&mid("JavaBaen", "x.Y")).unwrap();
        assert!(!item.is_valid());
        assert!(item.invalid_reason().unwrap().contains("JavaBaen"));
        assert_eq!(
            service.suggest_provider(&ProviderTag::new("JavaBaen").unwrap()).map(|t| t.as_str()),
            Some("JavaBean")
        );
    }

    #[test]
    fn test_stale_edges_pruned_after_recompute() {
        let b = CountingProvider::new("B", &["A"]);
        let switch = b.switch();
        let mut service = service_with(vec![CountingProvider::new("A", &[]), b]);

        service.get(&mid("B", "x.Y")).unwrap();
        assert!(service.dependencies().has_dependency(&mid("A", "x.Y"), &mid("B", "x.Y")));

        switch.set(false);
        service.get_with(&mid("B", "x.Y"), true).unwrap();
        assert!(!service.dependencies().has_dependency(&mid("A", "x.Y"), &mid("B", "x.Y")));
    }

    #[test]
    fn test_replacing_provider_evicts_its_items() {
        let mut service = service_with(vec![CountingProvider::new("A", &[])]);
        service.get(&mid("A", "x.Y")).unwrap();

        let replacement = CountingProvider::new("A", &[]);
        let count = replacement.counter();
        let previous = service.register_provider(Arc::new(replacement)).unwrap();
        assert!(previous.is_some());
        assert_eq!(service.state(&mid("A", "x.Y")), ItemState::Unknown);

        service.get(&mid("A", "x.Y")).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(service.provider_tags().len(), 1);
    }

    #[test]
    fn test_read_closing_cycle_with_cached_item_fails() {
        let b = CountingProvider::new("B", &["A"]);
        let switch = b.switch();
        switch.set(false);
        let mut service = service_with(vec![CountingProvider::new("A", &["B"]), b]);

        service.get(&mid("A", "x.Y")).unwrap();
        assert!(service.dependencies().has_dependency(&mid("B", "x.Y"), &mid("A", "x.Y")));

        switch.set(true);
        let err = service.get_with(&mid("B", "x.Y"), true).unwrap_err();
        assert!(matches!(err, MetadataError::CyclicDependency { .. }));
        assert!(!service.dependencies().has_dependency(&mid("A", "x.Y"), &mid("B", "x.Y")));
        assert!(!service.cached(&mid("B", "x.Y")).unwrap().is_valid());
        assert_ne!(service.state(&mid("A", "x.Y")), ItemState::Valid);
        assert!(service.notify_changed(&mid("A", "x.Y")).is_ok());
    }

    #[test]
    fn test_class_level_upstream_closing_cycle_rejected() {
        let mut service = service_with(vec![CountingProvider::new("A", &[]).with_class_upstream("B")]);
        let provider = CountingProvider::new("B", &[]).with_class_upstream("A");
        let err = service.register_provider(Arc::new(provider)).err().expect("expected registration to fail");
        assert!(matches!(err, MetadataError::CyclicDependency { .. }));
        assert_eq!(service.provider_tags().len(), 1);
        assert_eq!(service.dependencies().edge_count(), 1);
    }

    #[test]
    fn test_self_class_level_upstream_rejected() {
        let mut service = MetadataService::new();
        let provider = CountingProvider::new("A", &[]).with_class_upstream("A");
        let err = service.register_provider(Arc::new(provider)).err().expect("expected registration to fail");
        assert!(matches!(err, MetadataError::CyclicDependency { .. }));
        assert!(service.provider_tags().is_empty());
    }
}
