//! Change propagation through the dependency registry.

use anyhow::Result;
use itdgen::core::MetadataError;
use itdgen::metadata::{DependencyRegistry, ItemState, MetadataId, MetadataService};
use itdgen::test_utils::fixtures::{CountingProvider, mid};
use std::sync::Arc;

#[test]
fn test_registry_rejects_edge_closing_cycle() -> Result<()> {
    let mut service = MetadataService::new();
    for tag in ["A", "B", "C"] {
        service.register_provider(Arc::new(CountingProvider::new(tag, &[])))?;
    }
    for tag in ["A", "B", "C"] {
        service.get(&mid(tag, "x.T"))?;
    }

    let registry = service.dependencies_mut();
    registry.register_dependency(&mid("A", "x.T"), &mid("B", "x.T"))?;
    registry.register_dependency(&mid("B", "x.T"), &mid("C", "x.T"))?;
    let err = registry.register_dependency(&mid("C", "x.T"), &mid("A", "x.T")).unwrap_err();
    match err {
        MetadataError::CyclicDependency {
            cycle,
        } => assert_eq!(cycle.len(), 4),
        other => panic!("expected cycle, got {other:?}"),
    }

    let summary = service.notify_changed(&mid("A", "x.T"))?;
    assert_eq!(summary.invalidated, vec![mid("B", "x.T"), mid("C", "x.T")]);
    Ok(())
}

#[test]
fn test_read_turned_on_after_caching_cannot_close_cycle() -> Result<()> {
    let b = CountingProvider::new("B", &["A"]);
    let switch = b.switch();
    switch.set(false);
    let mut service = MetadataService::new();
    service.register_provider(Arc::new(CountingProvider::new("A", &["B"])))?;
    service.register_provider(Arc::new(b))?;

    service.get(&mid("A", "x.T"))?;
    switch.set(true);
    let err = service.get_with(&mid("B", "x.T"), true).unwrap_err();
    assert!(matches!(err, MetadataError::CyclicDependency { .. }));

    assert!(service.dependencies().has_dependency(&mid("B", "x.T"), &mid("A", "x.T")));
    assert!(!service.dependencies().has_dependency(&mid("A", "x.T"), &mid("B", "x.T")));
    assert_ne!(service.state(&mid("B", "x.T")), ItemState::Valid);
    assert_ne!(service.state(&mid("A", "x.T")), ItemState::Valid);
    service.notify_changed(&mid("A", "x.T"))?;
    Ok(())
}

#[test]
fn test_self_edge_is_rejected() {
    let mut registry = DependencyRegistry::new();
    let err = registry.register_dependency(&mid("A", "x.T"), &mid("A", "x.T")).unwrap_err();
    assert!(matches!(err, MetadataError::CyclicDependency { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_class_level_upstream_invalidates_matching_instance() -> Result<()> {
    let watcher = CountingProvider::new("Watcher", &[]).with_class_upstream("A");
    let count = watcher.counter();
    let mut service = MetadataService::new();
    service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    service.register_provider(Arc::new(watcher))?;

    service.get(&mid("Watcher", "x.One"))?;
    service.get(&mid("Watcher", "x.Two"))?;

    let summary = service.notify_changed(&mid("A", "x.One"))?;
    assert_eq!(summary.invalidated, vec![mid("Watcher", "x.One")]);
    assert_eq!(service.state(&mid("Watcher", "x.One")), ItemState::Invalid);
    assert_eq!(service.state(&mid("Watcher", "x.Two")), ItemState::Valid);

    service.get(&mid("Watcher", "x.One"))?;
    assert_eq!(count.get(), 3);
    Ok(())
}

#[test]
fn test_dropped_read_stops_notifications() -> Result<()> {
    let b = CountingProvider::new("B", &["A"]);
    let switch = b.switch();
    let mut service = MetadataService::new();
    service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    service.register_provider(Arc::new(b))?;

    service.get(&mid("B", "x.T"))?;
    switch.set(false);
    service.get_with(&mid("B", "x.T"), true)?;

    let summary = service.notify_changed(&mid("A", "x.T"))?;
    assert!(summary.invalidated.is_empty());
    assert_eq!(service.state(&mid("B", "x.T")), ItemState::Valid);
    Ok(())
}

#[test]
fn test_replacing_a_provider_invalidates_its_dependents() -> Result<()> {
    let b = CountingProvider::new("B", &["A"]);
    let cb = b.counter();
    let mut service = MetadataService::new();
    service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    service.register_provider(Arc::new(b))?;
    service.get(&mid("B", "x.T"))?;

    let previous = service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    assert!(previous.is_some());
    assert_eq!(service.state(&mid("A", "x.T")), ItemState::Unknown);
    assert_ne!(service.state(&mid("B", "x.T")), ItemState::Valid);

    service.get(&mid("B", "x.T"))?;
    assert_eq!(cb.get(), 2);
    Ok(())
}

#[test]
fn test_tree_string_shows_dependents() -> Result<()> {
    let mut service = MetadataService::new();
    service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    service.register_provider(Arc::new(CountingProvider::new("B", &["A"])))?;
    service.register_provider(Arc::new(CountingProvider::new("C", &["A"])))?;
    service.get(&mid("B", "x.T"))?;
    service.get(&mid("C", "x.T"))?;

    let root: MetadataId = mid("A", "x.T");
    let tree = service.dependencies().to_tree_string(&root);
    assert_eq!(
        tree,
        "└── MID:A#SRC_MAIN_JAVA?x.T\n    ├── MID:B#SRC_MAIN_JAVA?x.T\n    └── MID:C#SRC_MAIN_JAVA?x.T\n"
    );
    Ok(())
}
