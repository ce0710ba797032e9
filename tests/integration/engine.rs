//! Demand-driven computation: caching, recomputation counts, cycles and invalidity.

use anyhow::Result;
use itdgen::core::MetadataError;
use itdgen::metadata::{ItemState, MetadataService};
use itdgen::test_utils::fixtures::{CountingProvider, mid};
use std::sync::Arc;

fn service_with(providers: Vec<CountingProvider>) -> MetadataService {
    let mut service = MetadataService::new();
    for provider in providers {
        service.register_provider(Arc::new(provider)).expect("register provider");
    }
    service
}

#[test]
fn test_repeated_get_computes_once() -> Result<()> {
    itdgen::test_utils::init_test_logging(None);

    let a = CountingProvider::new("A", &[]);
    let count = a.counter();
    let mut service = service_with(vec![a]);

    let first = service.get(&mid("A", "com.example.Customer"))?;
    for _ in 0..5 {
        let again = service.get(&mid("A", "com.example.Customer"))?;
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(count.get(), 1);
    assert_eq!(service.stats().hits, 5);
    Ok(())
}

#[test]
fn test_chain_recomputes_each_link_once_after_change() -> Result<()> {
    let a = CountingProvider::new("A", &[]);
    let b = CountingProvider::new("B", &["A"]);
    let c = CountingProvider::new("C", &["B"]);
    let (ca, cb, cc) = (a.counter(), b.counter(), c.counter());
    let mut service = service_with(vec![a, b, c]);

    let top = mid("C", "x.T");
    assert!(service.get(&top)?.is_valid());
    assert_eq!((ca.get(), cb.get(), cc.get()), (1, 1, 1));

    let summary = service.notify_changed(&mid("A", "x.T"))?;
    assert_eq!(summary.invalidated, vec![mid("B", "x.T"), mid("C", "x.T")]);
    assert_eq!(service.state(&mid("B", "x.T")), ItemState::Invalid);

    assert!(service.get(&top)?.is_valid());
    assert_eq!((ca.get(), cb.get(), cc.get()), (2, 2, 2));
    assert_eq!(service.state(&mid("B", "x.T")), ItemState::Valid);
    Ok(())
}

#[test]
fn test_diamond_recomputes_shared_upstream_once() -> Result<()> {
    let a = CountingProvider::new("A", &[]);
    let b = CountingProvider::new("B", &["A"]);
    let c = CountingProvider::new("C", &["A"]);
    let d = CountingProvider::new("D", &["B", "C"]);
    let counters = [a.counter(), b.counter(), c.counter(), d.counter()];
    let mut service = service_with(vec![a, b, c, d]);

    service.get(&mid("D", "x.T"))?;
    assert_eq!(counters.iter().map(|c| c.get()).collect::<Vec<_>>(), vec![1, 1, 1, 1]);

    let summary = service.notify_changed(&mid("A", "x.T"))?;
    assert_eq!(summary.invalidated.len(), 3);

    service.get(&mid("D", "x.T"))?;
    assert_eq!(counters.iter().map(|c| c.get()).collect::<Vec<_>>(), vec![2, 2, 2, 2]);
    Ok(())
}

#[test]
fn test_unrelated_items_survive_a_change() -> Result<()> {
    let a = CountingProvider::new("A", &[]);
    let b = CountingProvider::new("B", &["A"]);
    let cb = b.counter();
    let mut service = service_with(vec![a, b]);

    service.get(&mid("B", "x.One"))?;
    service.get(&mid("B", "x.Two"))?;
    service.notify_changed(&mid("A", "x.One"))?;

    assert_eq!(service.state(&mid("B", "x.Two")), ItemState::Valid);
    service.get(&mid("B", "x.Two"))?;
    assert_eq!(cb.get(), 2);
    Ok(())
}

#[test]
fn test_computation_cycle_fails_and_leaves_items_invalid() -> Result<()> {
    let mut service = service_with(vec![
        CountingProvider::new("A", &["B"]),
        CountingProvider::new("B", &["C"]),
        CountingProvider::new("C", &["A"]),
    ]);

    let err = service.get(&mid("A", "x.T")).unwrap_err();
    let cycle = match err {
        MetadataError::CyclicDependency {
            cycle,
        } => cycle,
        other => panic!("expected a cycle, got {other}"),
    };
    assert_eq!(
        cycle,
        vec![
            "MID:A#SRC_MAIN_JAVA?x.T",
            "MID:B#SRC_MAIN_JAVA?x.T",
            "MID:C#SRC_MAIN_JAVA?x.T",
            "MID:A#SRC_MAIN_JAVA?x.T",
        ]
    );
    for tag in ["A", "B", "C"] {
        assert_eq!(service.state(&mid(tag, "x.T")), ItemState::Invalid, "{tag}");
    }
    assert!(!service.dependencies().has_dependency(&mid("A", "x.T"), &mid("C", "x.T")));

    // the service stays usable
    service.register_provider(Arc::new(CountingProvider::new("D", &[])))?;
    assert!(service.get(&mid("D", "x.T"))?.is_valid());
    Ok(())
}

#[test]
fn test_missing_upstream_makes_item_invalid() -> Result<()> {
    let mut service = service_with(vec![CountingProvider::new("B", &["A"])]);

    let item = service.get(&mid("B", "x.T"))?;
    assert!(!item.is_valid());
    assert!(item.invalid_reason().is_some_and(|r| r.contains("MID:A#SRC_MAIN_JAVA?x.T")));
    assert_eq!(service.state(&mid("A", "x.T")), ItemState::Invalid);
    Ok(())
}

#[test]
fn test_invalid_item_becomes_valid_once_upstream_appears() -> Result<()> {
    let mut service = service_with(vec![CountingProvider::new("B", &["A"])]);
    assert!(!service.get(&mid("B", "x.T"))?.is_valid());

    service.register_provider(Arc::new(CountingProvider::new("A", &[])))?;
    service.notify_changed(&mid("A", "x.T"))?;
    assert!(service.get(&mid("B", "x.T"))?.is_valid());
    Ok(())
}

#[test]
fn test_bounded_cache_recomputes_evicted_items() -> Result<()> {
    let a = CountingProvider::new("A", &[]);
    let count = a.counter();
    let mut service = MetadataService::with_cache_capacity(Some(2));
    service.register_provider(Arc::new(a))?;

    for name in ["x.One", "x.Two", "x.Three"] {
        service.get(&mid("A", name))?;
    }
    assert_eq!(service.state(&mid("A", "x.One")), ItemState::Unknown);
    service.get(&mid("A", "x.One"))?;
    assert_eq!(count.get(), 4);
    assert!(service.stats().evictions >= 1);
    Ok(())
}
