//! Shared provider logic for ITD-producing metadata.
//!
//! Every generator follows the same steps before it can add a single member: find the
//! governor's physical type, check that the governor carries one of the generator's
//! trigger annotations, optionally check it is a class, and name the aspect. The
//! [`ItdProvider`] wrapper does those steps once and hands the rest to an
//! [`ItdGenerator`].

use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::builder::ItdTypeDetailsBuilder;
use crate::constants::DEFAULT_ASPECT_INFIX;
use crate::core::MetadataError;
use crate::metadata::{
    MetadataContext, MetadataId, MetadataItem, MetadataProvider, Payload, ProviderTag,
};
use crate::model::{AnnotationMetadata, JavaType, LogicalPath, TypeDetails};
use crate::physical::{physical_type_id, physical_type_tag};

/// Result of a generator run.
#[derive(Debug)]
pub enum Generation {
    /// The populated builder.
    Itd(ItdTypeDetailsBuilder),
    /// The governor cannot be generated for, with the reason.
    Invalid(String),
}

/// Everything a generator knows about the identifier it is computing.
#[derive(Debug, Clone)]
pub struct ItdRequest {
    /// The identifier being computed.
    pub id: MetadataId,
    /// The governor's physical type.
    pub governor: Arc<TypeDetails>,
    /// The governor's logical path.
    pub path: LogicalPath,
    /// The trigger annotation found on the governor.
    pub trigger: AnnotationMetadata,
}

/// The part of an ITD provider that differs per artifact kind.
pub trait ItdGenerator: Send + Sync {
    /// The provider tag of the generated metadata.
    fn tag(&self) -> &ProviderTag;

    /// Appended to `<Governor><infix>` to name the aspect.
    fn aspect_suffix(&self) -> &str;

    /// Annotations that make a governor eligible. The first one found is passed to
    /// [`generate`](Self::generate).
    fn triggers(&self) -> Vec<JavaType>;

    /// Whether interfaces and enums are rejected.
    fn depends_on_governor_being_a_class(&self) -> bool {
        true
    }

    /// Add this generator's members to `builder`.
    ///
    /// Further upstream metadata may be read through `ctx`; missing upstreams should
    /// yield [`Generation::Invalid`] or a [`MetadataError::MissingUpstream`] error.
    fn generate(
        &self,
        request: &ItdRequest,
        builder: ItdTypeDetailsBuilder,
        ctx: &mut MetadataContext<'_>,
    ) -> Result<Generation, MetadataError>;
}

static CLASS_LEVEL_UPSTREAMS: LazyLock<Vec<ProviderTag>> =
    LazyLock::new(|| vec![physical_type_tag().clone()]);

/// A [`MetadataProvider`] wrapping an [`ItdGenerator`].
///
/// The provider listens to the `PhysicalType` provider at class level, so any change
/// to a physical type invalidates this provider's item for the same type and path,
/// even before that item was ever computed.
pub struct ItdProvider<G> {
    generator: G,
    aspect_infix: String,
}

impl<G: ItdGenerator> ItdProvider<G> {
    pub fn new(generator: G) -> Self {
        Self::with_infix(generator, DEFAULT_ASPECT_INFIX)
    }

    pub fn with_infix(generator: G, aspect_infix: impl Into<String>) -> Self {
        Self {
            generator,
            aspect_infix: aspect_infix.into(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// `com.example.Customer` -> `com.example.Customer_Roo_JavaBean`.
    pub fn aspect_name(&self, governor: &JavaType) -> JavaType {
        JavaType::new(format!(
            "{}{}{}",
            governor.fully_qualified_name(),
            self.aspect_infix,
            self.generator.aspect_suffix()
        ))
    }
}

impl<G: ItdGenerator> MetadataProvider for ItdProvider<G> {
    fn provides_type(&self) -> &ProviderTag {
        self.generator.tag()
    }

    fn get(
        &self,
        id: &MetadataId,
        ctx: &mut MetadataContext<'_>,
    ) -> Result<MetadataItem, MetadataError> {
        let (Some(target), Some(path)) = (id.target_type(), id.path()) else {
            return Err(MetadataError::malformed(id.to_string(), "expected an instance identifier"));
        };

        let physical = ctx.require(&physical_type_id(target, path))?;
        let Some(governor) = physical.type_details().cloned() else {
            return Ok(MetadataItem::invalid(id.clone(), "upstream is not a physical type"));
        };

        let triggers = self.generator.triggers();
        let Some(trigger) = governor
            .annotations
            .iter()
            .find(|a| triggers.contains(&a.annotation_type))
            .cloned()
        else {
            debug!("{} carries no trigger annotation for {}", target, self.generator.tag());
            return Ok(MetadataItem::invalid(id.clone(), "governor has no trigger annotation"));
        };

        if self.generator.depends_on_governor_being_a_class() && !governor.is_class() {
            return Ok(MetadataItem::invalid(id.clone(), "governor is not a class"));
        }

        let builder =
            ItdTypeDetailsBuilder::new(id.clone(), self.aspect_name(target), Arc::clone(&governor));
        let request = ItdRequest {
            id: id.clone(),
            governor,
            path: path.clone(),
            trigger,
        };

        match self.generator.generate(&request, builder, ctx)? {
            Generation::Itd(builder) => {
                Ok(MetadataItem::valid(id.clone(), Payload::Itd(Arc::new(builder.build()))))
            }
            Generation::Invalid(reason) => Ok(MetadataItem::invalid(id.clone(), reason)),
        }
    }

    fn triggers(&self) -> Vec<JavaType> {
        self.generator.triggers()
    }

    fn class_level_upstreams(&self) -> Vec<ProviderTag> {
        CLASS_LEVEL_UPSTREAMS.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ItemState, MetadataService};
    use crate::model::{FieldMetadata, JavaSymbolName, TypeCategory};
    use crate::physical::{PhysicalTypeProvider, TypeRepository};

    struct Marker {
        tag: ProviderTag,
    }

    impl ItdGenerator for Marker {
        fn tag(&self) -> &ProviderTag {
            &self.tag
        }

        fn aspect_suffix(&self) -> &str {
            "Marker"
        }

        fn triggers(&self) -> Vec<JavaType> {
            vec![JavaType::new("a.RooMarker")]
        }

        fn generate(
            &self,
            request: &ItdRequest,
            mut builder: ItdTypeDetailsBuilder,
            _ctx: &mut MetadataContext<'_>,
        ) -> Result<Generation, MetadataError> {
            for field in &request.governor.fields {
                let name = field.name.prefixed("marked");
                builder.add_field(FieldMetadata::new(name, JavaType::boolean_primitive()));
            }
            Ok(Generation::Itd(builder))
        }
    }

    fn setup(details: TypeDetails) -> (MetadataService, MetadataId) {
        let repository: TypeRepository = [details.clone()].into_iter().collect();
        let mut service = MetadataService::new();
        service
            .register_provider(Arc::new(PhysicalTypeProvider::new(Arc::new(
                std::sync::RwLock::new(repository),
            ))))
            .unwrap();
        let provider = ItdProvider::new(Marker {
            tag: ProviderTag::new("Marker").unwrap(),
        });
        service.register_provider(Arc::new(provider)).unwrap();
        let id = MetadataId::create(&ProviderTag::new("Marker").unwrap(), &details.name, &details.path);
        (service, id)
    }

    fn governor() -> TypeDetails {
        TypeDetails::class(JavaType::new("a.Customer"), LogicalPath::src_main_java())
            .with_annotation(AnnotationMetadata::marker(JavaType::new("a.RooMarker")))
            .with_field(FieldMetadata::new(JavaSymbolName::new("name").unwrap(), JavaType::string()))
    }

    #[test]
    fn test_generates_into_named_aspect() {
        let (mut service, id) = setup(governor());
        let item = service.get(&id).unwrap();
        let itd = item.itd().expect("valid ITD");
        assert_eq!(itd.aspect().fully_qualified_name(), "a.Customer_Roo_Marker");
        assert_eq!(itd.fields()[0].name.as_str(), "markedName");
    }

    #[test]
    fn test_missing_trigger_is_invalid() {
        let mut details = governor();
        details.annotations.clear();
        let (mut service, id) = setup(details);
        let item = service.get(&id).unwrap();
        assert_eq!(item.invalid_reason(), Some("governor has no trigger annotation"));
        assert_eq!(service.state(&id), ItemState::Invalid);
    }

    #[test]
    fn test_interface_governor_is_invalid() {
        let mut details = governor();
        details.category = TypeCategory::Interface;
        let (mut service, id) = setup(details);
        assert!(!service.get(&id).unwrap().is_valid());
    }

    #[test]
    fn test_missing_physical_type_is_invalid_not_error() {
        let (mut service, _) = setup(governor());
        let other = MetadataId::create(
            &ProviderTag::new("Marker").unwrap(),
            &JavaType::new("a.Missing"),
            &LogicalPath::src_main_java(),
        );
        let item = service.get(&other).unwrap();
        assert!(!item.is_valid());
        assert!(item.invalid_reason().unwrap().contains("a.Missing"));
    }
}
