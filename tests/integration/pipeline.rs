//! Change events from concurrent producers, applied through the pipeline.

use anyhow::Result;
use itdgen::addons::register_builtin;
use itdgen::config::EngineConfig;
use itdgen::metadata::{ChangeEvent, ChangePipeline, ItemState, MetadataService, SharedMetadataService};
use itdgen::model::{AnnotationMetadata, FieldMetadata, JavaSymbolName, JavaType, LogicalPath, TypeDetails, well_known};
use itdgen::physical::TypeRepository;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::common::id_at;

fn bean(name: &str, fields: &[&str]) -> TypeDetails {
    let mut details = TypeDetails::class(JavaType::new(name), LogicalPath::src_main_java())
        .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ROO_JAVA_BEAN)));
    for field in fields {
        details = details
            .with_field(FieldMetadata::new(JavaSymbolName::new(*field).expect("symbol"), JavaType::string()));
    }
    details
}

fn builtin_service(repository: &itdgen::physical::SharedTypeRepository) -> Result<SharedMetadataService> {
    let mut service = MetadataService::new();
    register_builtin(&mut service, Arc::clone(repository), &EngineConfig::default())?;
    Ok(Arc::new(Mutex::new(service)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_feed_one_engine() -> Result<()> {
    let repository = TypeRepository::shared();
    let service = builtin_service(&repository)?;
    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 4);

    let mut producers = Vec::new();
    for producer in 0..4 {
        let sender = pipeline.sender();
        producers.push(tokio::spawn(async move {
            for i in 0..5 {
                let name = format!("com.example.P{producer}T{i}");
                sender.send(ChangeEvent::TypeChanged(bean(&name, &["name"]))).await?;
            }
            anyhow::Ok(())
        }));
    }
    for producer in producers {
        producer.await??;
    }

    let report = pipeline.finish().await?;
    assert_eq!(report.events_applied, 20);
    assert!(report.failures.is_empty());
    assert_eq!(repository.read().map_err(|_| anyhow::anyhow!("poisoned"))?.len(), 20);

    let mut service = service.lock().await;
    for producer in 0..4 {
        for i in 0..5 {
            let name = format!("com.example.P{producer}T{i}");
            let item = service.get(&id_at("JavaBean", &name, LogicalPath::src_main_java()))?;
            assert!(item.is_valid(), "{name}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_changes_invalidate_computed_aspects() -> Result<()> {
    let repository = TypeRepository::shared();
    let service = builtin_service(&repository)?;
    let bean_id = id_at("JavaBean", "com.example.Svc", LogicalPath::src_main_java());

    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 8);
    pipeline.submit(ChangeEvent::TypeChanged(bean("com.example.Svc", &["name"]))).await?;
    let report = pipeline.finish().await?;
    assert_eq!(report.events_applied, 1);
    assert!(service.lock().await.get(&bean_id)?.is_valid());

    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 8);
    pipeline.submit(ChangeEvent::TypeChanged(bean("com.example.Svc", &["name", "email"]))).await?;
    let report = pipeline.finish().await?;
    assert!(report.invalidated >= 1);

    let mut service = service.lock().await;
    assert_eq!(service.state(&bean_id), ItemState::Invalid);
    let item = service.get(&bean_id)?;
    let methods: Vec<String> = item.itd().expect("valid").methods().iter().map(|m| m.signature()).collect();
    assert!(methods.contains(&"getEmail()".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_removed_type_makes_aspect_invalid() -> Result<()> {
    let repository = TypeRepository::shared();
    let service = builtin_service(&repository)?;
    let bean_id = id_at("JavaBean", "com.example.Svc", LogicalPath::src_main_java());

    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 8);
    pipeline.submit(ChangeEvent::TypeChanged(bean("com.example.Svc", &["name"]))).await?;
    pipeline.finish().await?;
    assert!(service.lock().await.get(&bean_id)?.is_valid());

    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 8);
    pipeline
        .submit(ChangeEvent::TypeRemoved {
            name: JavaType::new("com.example.Svc"),
            path: LogicalPath::src_main_java(),
        })
        .await?;
    pipeline.finish().await?;

    let item = service.lock().await.get(&bean_id)?;
    assert!(!item.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_rejected_cycle_leaves_pipeline_clean() -> Result<()> {
    let repository = TypeRepository::shared();
    let service = builtin_service(&repository)?;
    let a = id_at("JavaBean", "com.example.A", LogicalPath::src_main_java());
    let b = id_at("JavaBean", "com.example.B", LogicalPath::src_main_java());
    {
        let mut guard = service.lock().await;
        guard.dependencies_mut().register_dependency(&a, &b)?;
        assert!(guard.dependencies_mut().register_dependency(&b, &a).is_err());
    }

    let pipeline = ChangePipeline::spawn(Arc::clone(&service), Arc::clone(&repository), 8);
    pipeline.submit(ChangeEvent::Notify(a.clone())).await?;
    pipeline.submit(ChangeEvent::TypeChanged(bean("com.example.Svc", &[]))).await?;
    let report = pipeline.finish().await?;

    assert_eq!(report.events_applied, 2);
    assert!(report.failures.is_empty());
    Ok(())
}
