//! Parsed member structure of a user-owned type.

use serde::{Deserialize, Serialize};

use super::java_type::JavaType;
use super::members::{AnnotationMetadata, FieldMetadata, MethodMetadata, find_annotation};
use super::path::{LogicalPath, Modifier};
use super::symbol::JavaSymbolName;

/// What kind of type declaration this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    #[default]
    Class,
    Interface,
    Enum,
}

/// The declared fields, methods and annotations of a physical type.
///
/// This is the read-only view the physical type layer exposes to providers. Member
/// vectors are in declaration order, which generators rely on for stable output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDetails {
    pub name: JavaType,
    #[serde(default)]
    pub path: LogicalPath,
    #[serde(default)]
    pub category: TypeCategory,
    #[serde(default = "default_type_modifier")]
    pub modifier: Modifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodMetadata>,
}

fn default_type_modifier() -> Modifier {
    Modifier::PUBLIC
}

impl TypeDetails {
    /// An empty public class.
    pub fn class(name: JavaType, path: LogicalPath) -> Self {
        Self {
            name,
            path,
            category: TypeCategory::Class,
            modifier: Modifier::PUBLIC,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationMetadata) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_class(&self) -> bool {
        self.category == TypeCategory::Class
    }

    pub fn annotation(&self, annotation_type: &JavaType) -> Option<&AnnotationMetadata> {
        find_annotation(&self.annotations, annotation_type)
    }

    pub fn has_annotation(&self, annotation_type: &JavaType) -> bool {
        self.annotation(annotation_type).is_some()
    }

    pub fn field(&self, name: &JavaSymbolName) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| &f.name == name)
    }

    pub fn method(&self, name: &JavaSymbolName, parameter_types: &[JavaType]) -> Option<&MethodMetadata> {
        self.methods.iter().find(|m| m.matches_signature(name, parameter_types))
    }

    /// Remove a field by name, returning whether one was present.
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name.as_str() != name);
        before != self.fields.len()
    }
}
