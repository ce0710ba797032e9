//! Incremental construction of [`ItdTypeDetails`].

use std::sync::Arc;

use tracing::trace;

use super::details::ItdTypeDetails;
use crate::metadata::MetadataId;
use crate::model::{AnnotationMetadata, FieldMetadata, JavaType, MethodMetadata, TypeDetails};

/// Collects the members an ITD introduces, refusing duplicates.
///
/// A member is skipped when the governor already declares it (the user's declaration
/// wins) or when the builder already holds one with the same name (fields), type
/// (annotations) or signature (methods). Insertion order is preserved.
#[derive(Debug, Clone)]
pub struct ItdTypeDetailsBuilder {
    declared_by: MetadataId,
    aspect: JavaType,
    governor: Arc<TypeDetails>,
    type_annotations: Vec<AnnotationMetadata>,
    fields: Vec<FieldMetadata>,
    methods: Vec<MethodMetadata>,
}

impl ItdTypeDetailsBuilder {
    pub fn new(declared_by: MetadataId, aspect: JavaType, governor: Arc<TypeDetails>) -> Self {
        Self {
            declared_by,
            aspect,
            governor,
            type_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The governor's declared members.
    pub fn governor(&self) -> &TypeDetails {
        &self.governor
    }

    pub fn aspect(&self) -> &JavaType {
        &self.aspect
    }

    /// Introduce a type-level annotation. Returns `false` if it was skipped.
    pub fn add_type_annotation(&mut self, annotation: AnnotationMetadata) -> bool {
        let ty = &annotation.annotation_type;
        if self.governor.has_annotation(ty)
            || self.type_annotations.iter().any(|a| &a.annotation_type == ty)
        {
            trace!("Skipping type annotation {} on {}", ty, self.governor.name);
            return false;
        }
        self.type_annotations.push(annotation);
        true
    }

    /// Introduce a field. Returns `false` if it was skipped.
    pub fn add_field(&mut self, field: FieldMetadata) -> bool {
        if self.governor.field(&field.name).is_some() || self.has_field(field.name.as_str()) {
            trace!("Skipping field {} on {}", field.name, self.governor.name);
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Introduce a method. Returns `false` if it was skipped.
    pub fn add_method(&mut self, method: MethodMetadata) -> bool {
        let parameter_types: Vec<JavaType> =
            method.parameters.iter().map(|p| p.param_type.clone()).collect();
        if self.governor.method(&method.name, &parameter_types).is_some()
            || self.methods.iter().any(|m| m.matches_signature(&method.name, &parameter_types))
        {
            trace!("Skipping method {} on {}", method.signature(), self.governor.name);
            return false;
        }
        self.methods.push(method);
        true
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.as_str() == name)
    }

    pub fn methods(&self) -> &[MethodMetadata] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn build(self) -> ItdTypeDetails {
        ItdTypeDetails {
            declared_by: self.declared_by,
            aspect: self.aspect,
            governor: self.governor.name.clone(),
            type_annotations: self.type_annotations,
            fields: self.fields,
            methods: self.methods,
        }
    }
}
