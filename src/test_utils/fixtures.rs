//! Test fixtures for creating sample data structures
//!
//! This module provides a configurable provider for engine tests, sample Java types
//! for addon tests and sample project files for CLI and configuration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::MetadataError;
use crate::metadata::{MetadataContext, MetadataId, MetadataItem, MetadataProvider, Payload, ProviderTag};
use crate::model::{
    AnnotationAttributeValue, AnnotationMetadata, FieldMetadata, JavaSymbolName, JavaType, LogicalPath,
    TypeDetails, well_known,
};

/// `MID:<tag>#SRC_MAIN_JAVA?<type_name>`.
pub fn mid(tag: &str, type_name: &str) -> MetadataId {
    MetadataId::create(&tag_of(tag), &JavaType::new(type_name), &LogicalPath::src_main_java())
}

fn tag_of(tag: &str) -> ProviderTag {
    ProviderTag::new(tag).unwrap_or_else(|e| panic!("invalid test tag {tag}: {e}"))
}

fn sym(name: &str) -> JavaSymbolName {
    JavaSymbolName::new(name).unwrap_or_else(|e| panic!("invalid test symbol {name}: {e}"))
}

/// Shared view of how often a [`CountingProvider`] computed.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Shared toggle deciding whether a [`CountingProvider`] reads its upstreams.
#[derive(Debug, Clone)]
pub struct Switch(Arc<AtomicBool>);

impl Switch {
    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::SeqCst);
    }
}

/// A provider that counts its computations.
///
/// For an identifier `MID:<tag>#<PATH>?<T>` it requires `MID:<u>#<PATH>?<T>` for every
/// configured upstream tag `u`, so a missing or invalid upstream makes it invalid.
#[derive(Debug)]
pub struct CountingProvider {
    tag: ProviderTag,
    upstreams: Vec<ProviderTag>,
    class_upstreams: Vec<ProviderTag>,
    counter: Counter,
    reads_upstreams: Arc<AtomicBool>,
}

impl CountingProvider {
    pub fn new(tag: &str, upstream_tags: &[&str]) -> Self {
        Self {
            tag: tag_of(tag),
            upstreams: upstream_tags.iter().map(|t| tag_of(t)).collect(),
            class_upstreams: Vec::new(),
            counter: Counter::default(),
            reads_upstreams: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Also depend on every identifier of `tag`.
    #[must_use]
    pub fn with_class_upstream(mut self, tag: &str) -> Self {
        self.class_upstreams.push(tag_of(tag));
        self
    }

    pub fn counter(&self) -> Counter {
        self.counter.clone()
    }

    pub fn switch(&self) -> Switch {
        Switch(Arc::clone(&self.reads_upstreams))
    }
}

impl MetadataProvider for CountingProvider {
    fn provides_type(&self) -> &ProviderTag {
        &self.tag
    }

    fn get(&self, id: &MetadataId, ctx: &mut MetadataContext<'_>) -> Result<MetadataItem, MetadataError> {
        self.counter.0.fetch_add(1, Ordering::SeqCst);
        if self.reads_upstreams.load(Ordering::SeqCst) {
            for tag in &self.upstreams {
                if let Some(upstream) = id.with_tag(tag) {
                    ctx.require(&upstream)?;
                }
            }
        }
        Ok(MetadataItem::valid(id.clone(), Payload::Empty))
    }

    fn class_level_upstreams(&self) -> Vec<ProviderTag> {
        self.class_upstreams.clone()
    }
}

/// `com.example.Customer`: a `@RooJavaBean` entity with `id`, `version`, a constrained
/// `name` and an `age`.
pub fn customer_entity() -> TypeDetails {
    TypeDetails::class(JavaType::new("com.example.Customer"), LogicalPath::src_main_java())
        .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ROO_JAVA_BEAN)))
        .with_field(
            FieldMetadata::new(sym("id"), JavaType::new("java.lang.Long"))
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ID))),
        )
        .with_field(
            FieldMetadata::new(sym("version"), JavaType::new("java.lang.Integer"))
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::VERSION))),
        )
        .with_field(
            FieldMetadata::new(sym("name"), JavaType::string())
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::NOT_NULL)))
                .with_annotation(
                    AnnotationMetadata::marker(well_known::ty(well_known::SIZE))
                        .with_attribute(sym("max"), AnnotationAttributeValue::Integer(30)),
                ),
        )
        .with_field(FieldMetadata::new(sym("age"), JavaType::int_primitive()))
}

/// `com.example.Order`: a `@RooJavaBean` entity with a required `@ManyToOne` customer.
pub fn order_entity() -> TypeDetails {
    TypeDetails::class(JavaType::new("com.example.Order"), LogicalPath::src_main_java())
        .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ROO_JAVA_BEAN)))
        .with_field(
            FieldMetadata::new(sym("id"), JavaType::new("java.lang.Long"))
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::ID))),
        )
        .with_field(
            FieldMetadata::new(sym("customer"), JavaType::new("com.example.Customer"))
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::NOT_NULL)))
                .with_annotation(AnnotationMetadata::marker(well_known::ty(well_known::MANY_TO_ONE))),
        )
}

/// `com.example.CustomerDataOnDemand` in `SRC_TEST_JAVA`.
pub fn customer_dod() -> TypeDetails {
    TypeDetails::class(
        JavaType::new("com.example.CustomerDataOnDemand"),
        LogicalPath::src_test_java(),
    )
    .with_annotation(
        AnnotationMetadata::marker(well_known::ty(well_known::ROO_DATA_ON_DEMAND)).with_attribute(
            sym("entity"),
            AnnotationAttributeValue::Class {
                class: JavaType::new("com.example.Customer"),
            },
        ),
    )
}

/// Test fixture for creating sample itdgen.toml files
#[derive(Clone, Debug)]
pub struct ProjectFixture {
    pub content: String,
    pub name: String,
}

impl ProjectFixture {
    /// A customer entity with JavaBean and data-on-demand aspects.
    pub fn customer() -> Self {
        Self {
            name: "customer".to_string(),
            content: r#"
[[types]]
name = "com.example.Customer"
annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]

[[types.fields]]
name = "id"
type = "java.lang.Long"
annotations = ["javax.persistence.Id"]

[[types.fields]]
name = "name"
type = "java.lang.String"
annotations = [
    "javax.validation.constraints.NotNull",
    { type = "javax.validation.constraints.Size", attributes = { max = 30 } },
]

[[types.fields]]
name = "age"
type = "int"

[[types]]
name = "com.example.CustomerDataOnDemand"
path = "SRC_TEST_JAVA"
annotations = [
    { type = "org.springframework.roo.addon.dod.RooDataOnDemand", attributes = { entity = { class = "com.example.Customer" }, quantity = 5 } },
]
"#
            .trim()
            .to_string(),
        }
    }

    /// A bean whose fields are driven by a test.
    pub fn service() -> Self {
        Self {
            name: "service".to_string(),
            content: r#"
[engine]
aspect_infix = "_Roo_"

[[types]]
name = "com.example.Svc"
annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]

[[types.fields]]
name = "name"
type = "java.lang.String"

[[types.fields]]
name = "age"
type = "int"
"#
            .trim()
            .to_string(),
        }
    }

    /// A type whose name is not a Java identifier.
    pub fn invalid_type_name() -> Self {
        Self {
            name: "invalid_type_name".to_string(),
            content: r#"
[[types]]
name = "com.example.2Bad"
"#
            .trim()
            .to_string(),
        }
    }

    /// Project file with invalid TOML syntax
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: r#"
[[types]
name = "com.example.Customer"
"#
            .trim()
            .to_string(),
        }
    }

    /// Write the fixture to `dir/itdgen.toml` and return the path.
    pub fn write_to(&self, dir: &std::path::Path) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(crate::constants::DEFAULT_PROJECT_FILE);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}
