//! JavaBean accessors and mutators.
//!
//! For a governor annotated `@RooJavaBean`, every non-static declared field gets a
//! `getX()` (or `isX()` for a primitive `boolean`) and, unless the field is final, a
//! `setX(T x)`. Methods the governor already declares are left alone. The annotation
//! attributes `gettersByDefault` and `settersByDefault` (both default `true`) switch
//! either half off.

use std::sync::LazyLock;

use crate::core::MetadataError;
use crate::itd::{Generation, InvocableMemberBodyBuilder, ItdGenerator, ItdRequest, ItdTypeDetailsBuilder};
use crate::metadata::{MetadataContext, ProviderTag};
use crate::model::{
    AnnotationAttributeValue, FieldMetadata, JavaSymbolName, JavaType, MethodMetadata, Modifier,
    well_known,
};

/// Tag of JavaBean metadata.
pub const JAVA_BEAN: &str = "JavaBean";

static JAVA_BEAN_TAG: LazyLock<ProviderTag> = LazyLock::new(|| ProviderTag::from_static(JAVA_BEAN));

pub fn java_bean_tag() -> &'static ProviderTag {
    &JAVA_BEAN_TAG
}

/// `getName`, or `isActive` for a primitive boolean field.
pub fn accessor_name(field: &FieldMetadata) -> JavaSymbolName {
    if field.field_type == JavaType::boolean_primitive() {
        field.name.prefixed("is")
    } else {
        field.name.prefixed("get")
    }
}

/// `setName`.
pub fn mutator_name(field: &FieldMetadata) -> JavaSymbolName {
    field.name.prefixed("set")
}

/// Generator behind the `JavaBean` provider.
#[derive(Debug, Default)]
pub struct JavaBeanGenerator;

impl JavaBeanGenerator {
    fn accessor(field: &FieldMetadata) -> MethodMetadata {
        let mut body = InvocableMemberBodyBuilder::new();
        body.append_formal_line(format!("return this.{};", field.name));
        MethodMetadata::new(accessor_name(field), field.field_type.clone()).with_body(body.output())
    }

    fn mutator(field: &FieldMetadata) -> MethodMetadata {
        let mut body = InvocableMemberBodyBuilder::new();
        body.append_formal_line(format!("this.{0} = {0};", field.name));
        MethodMetadata::new(mutator_name(field), JavaType::void_primitive())
            .with_parameter(field.name.clone(), field.field_type.clone())
            .with_body(body.output())
    }
}

fn flag(request: &ItdRequest, name: &str) -> bool {
    !matches!(
        request.trigger.attribute(name),
        Some(AnnotationAttributeValue::Boolean(false))
    )
}

impl ItdGenerator for JavaBeanGenerator {
    fn tag(&self) -> &ProviderTag {
        java_bean_tag()
    }

    fn aspect_suffix(&self) -> &str {
        JAVA_BEAN
    }

    fn triggers(&self) -> Vec<JavaType> {
        vec![well_known::ty(well_known::ROO_JAVA_BEAN)]
    }

    fn generate(
        &self,
        request: &ItdRequest,
        mut builder: ItdTypeDetailsBuilder,
        _ctx: &mut MetadataContext<'_>,
    ) -> Result<Generation, MetadataError> {
        let getters = flag(request, "gettersByDefault");
        let setters = flag(request, "settersByDefault");

        for field in request.governor.fields.iter().filter(|f| !f.modifier.is_static()) {
            if getters {
                builder.add_method(Self::accessor(field));
            }
            if setters && !field.modifier.contains(Modifier::FINAL) {
                builder.add_method(Self::mutator(field));
            }
        }

        Ok(Generation::Itd(builder))
    }
}
