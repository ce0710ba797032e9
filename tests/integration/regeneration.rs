//! Deterministic output and incremental regeneration of aspects.

use anyhow::Result;
use itdgen::metadata::ItemState;
use itdgen::model::{
    AnnotationMetadata, FieldMetadata, JavaSymbolName, JavaType, LogicalPath, MethodMetadata, TypeDetails,
    well_known,
};
use itdgen::test_utils::fixtures::{customer_dod, customer_entity};

use crate::common::{Engine, id_at};

fn sym(name: &str) -> JavaSymbolName {
    JavaSymbolName::new(name).expect("symbol")
}

fn svc(fields: &[(&str, JavaType)]) -> TypeDetails {
    let mut details = TypeDetails::class(JavaType::new("com.example.Svc"), LogicalPath::src_main_java())
        .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ROO_JAVA_BEAN)));
    for (name, ty) in fields {
        details = details.with_field(FieldMetadata::new(sym(name), ty.clone()));
    }
    details
}

fn bean_methods(engine: &mut Engine, type_name: &str) -> Result<Vec<String>> {
    let item = engine.service.get(&id_at("JavaBean", type_name, LogicalPath::src_main_java()))?;
    let itd = item.itd().ok_or_else(|| anyhow::anyhow!("{type_name} has no valid JavaBean aspect"))?;
    Ok(itd.methods().iter().map(MethodMetadata::signature).collect())
}

#[test]
fn test_render_is_identical_across_engines() -> Result<()> {
    let id = id_at("DataOnDemand", "com.example.CustomerDataOnDemand", LogicalPath::src_test_java());

    let mut first = Engine::new([customer_entity(), customer_dod()])?;
    let mut second = Engine::new([customer_dod(), customer_entity()])?;
    let a = first.service.get(&id)?;
    let b = second.service.get(&id)?;

    let (a, b) = (a.itd().expect("valid"), b.itd().expect("valid"));
    assert_eq!(a.render(), b.render());
    assert_eq!(a.digest(), b.digest());
    Ok(())
}

#[test]
fn test_removed_field_drops_its_accessors() -> Result<()> {
    let mut engine = Engine::new([svc(&[("name", JavaType::string()), ("age", JavaType::int_primitive())])])?;
    assert_eq!(
        bean_methods(&mut engine, "com.example.Svc")?,
        vec!["getName()", "setName(java.lang.String)", "getAge()", "setAge(int)"]
    );

    engine.change(svc(&[("name", JavaType::string())]))?;
    let bean = id_at("JavaBean", "com.example.Svc", LogicalPath::src_main_java());
    assert_eq!(engine.service.state(&bean), ItemState::Invalid);

    assert_eq!(bean_methods(&mut engine, "com.example.Svc")?, vec!["getName()", "setName(java.lang.String)"]);
    let rendered = engine.service.get(&bean)?.itd().expect("valid").render();
    assert!(!rendered.contains("getAge"));
    assert!(!rendered.contains("setAge"));
    Ok(())
}

#[test]
fn test_unchanged_model_keeps_its_digest() -> Result<()> {
    let details = svc(&[("name", JavaType::string())]);
    let mut engine = Engine::new([details.clone()])?;
    let bean = id_at("JavaBean", "com.example.Svc", LogicalPath::src_main_java());
    let before = engine.service.get(&bean)?.itd().expect("valid").digest();

    engine.change(details)?;
    let after = engine.service.get(&bean)?;
    assert_eq!(after.itd().expect("valid").digest(), before);
    Ok(())
}

#[test]
fn test_entity_change_regenerates_data_on_demand() -> Result<()> {
    let mut engine = Engine::new([customer_entity(), customer_dod()])?;
    let dod = id_at("DataOnDemand", "com.example.CustomerDataOnDemand", LogicalPath::src_test_java());
    let before = engine.service.get(&dod)?;
    assert!(before.is_valid());

    engine.change(customer_entity().with_field(FieldMetadata::new(sym("email"), JavaType::string())))?;
    assert_eq!(engine.service.state(&dod), ItemState::Invalid);

    let after = engine.service.get(&dod)?;
    let transient = after.itd().expect("valid").methods()[0].body.clone().unwrap_or_default();
    assert!(transient.contains("obj.setEmail(\"email_\" + index);"), "{transient}");
    assert_ne!(before.itd().expect("valid").digest(), after.itd().expect("valid").digest());
    Ok(())
}

#[test]
fn test_unrelated_change_leaves_data_on_demand_cached() -> Result<()> {
    let mut engine = Engine::new([customer_entity(), customer_dod(), svc(&[("name", JavaType::string())])])?;
    let dod = id_at("DataOnDemand", "com.example.CustomerDataOnDemand", LogicalPath::src_test_java());
    let before = engine.service.get(&dod)?;

    engine.change(svc(&[]))?;
    assert_eq!(engine.service.state(&dod), ItemState::Valid);
    let after = engine.service.get(&dod)?;
    assert!(std::sync::Arc::ptr_eq(&before, &after));
    Ok(())
}
