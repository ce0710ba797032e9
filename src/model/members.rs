//! Annotations, fields and methods of the Java metamodel.
//!
//! These are plain value objects. The same types describe members the user wrote
//! (read from the physical type layer) and members the engine synthesizes into an ITD,
//! which is what lets a generator ask "did the user already declare this?".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::java_type::JavaType;
use super::path::Modifier;
use super::symbol::JavaSymbolName;

/// The value of a single annotation attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationAttributeValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    /// A class literal, written `{ class = "com.example.Customer" }` in project files.
    Class {
        class: JavaType,
    },
    /// An enum constant, written `{ enum = "...Propagation", constant = "REQUIRES_NEW" }`.
    Enum {
        #[serde(rename = "enum")]
        enum_type: JavaType,
        constant: JavaSymbolName,
    },
}

impl AnnotationAttributeValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&JavaType> {
        match self {
            Self::Class {
                class,
            } => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "\"{}\"", value.replace('"', "\\\"")),
            Self::Class {
                class,
            } => write!(f, "{class}.class"),
            Self::Enum {
                enum_type,
                constant,
            } => write!(f, "{enum_type}.{constant}"),
        }
    }
}

/// An annotation with its attributes, kept sorted by attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AnnotationRepr", into = "AnnotationRepr")]
pub struct AnnotationMetadata {
    pub annotation_type: JavaType,
    pub attributes: BTreeMap<JavaSymbolName, AnnotationAttributeValue>,
}

/// Project files may write a marker annotation as a bare type name.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AnnotationRepr {
    Marker(JavaType),
    Full {
        #[serde(rename = "type")]
        annotation_type: JavaType,
        #[serde(default)]
        attributes: BTreeMap<JavaSymbolName, AnnotationAttributeValue>,
    },
}

impl From<AnnotationRepr> for AnnotationMetadata {
    fn from(value: AnnotationRepr) -> Self {
        match value {
            AnnotationRepr::Marker(annotation_type) => Self::marker(annotation_type),
            AnnotationRepr::Full {
                annotation_type,
                attributes,
            } => Self {
                annotation_type,
                attributes,
            },
        }
    }
}

impl From<AnnotationMetadata> for AnnotationRepr {
    fn from(value: AnnotationMetadata) -> Self {
        if value.attributes.is_empty() {
            Self::Marker(value.annotation_type)
        } else {
            Self::Full {
                annotation_type: value.annotation_type,
                attributes: value.attributes,
            }
        }
    }
}

impl AnnotationMetadata {
    /// An annotation without attributes.
    pub fn marker(annotation_type: JavaType) -> Self {
        Self {
            annotation_type,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: JavaSymbolName, value: AnnotationAttributeValue) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AnnotationAttributeValue> {
        self.attributes.iter().find(|(key, _)| key.as_str() == name).map(|(_, value)| value)
    }
}

impl fmt::Display for AnnotationMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation_type)?;
        if !self.attributes.is_empty() {
            let attrs: Vec<String> =
                self.attributes.iter().map(|(name, value)| format!("{name} = {value}")).collect();
            write!(f, "({})", attrs.join(", "))?;
        }
        Ok(())
    }
}

/// Find the first annotation of the given type.
pub fn find_annotation<'a>(
    annotations: &'a [AnnotationMetadata],
    annotation_type: &JavaType,
) -> Option<&'a AnnotationMetadata> {
    annotations.iter().find(|a| &a.annotation_type == annotation_type)
}

fn default_field_modifier() -> Modifier {
    Modifier::PRIVATE
}

fn default_method_modifier() -> Modifier {
    Modifier::PUBLIC
}

/// A field declared by a type or introduced by an ITD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: JavaSymbolName,
    #[serde(rename = "type")]
    pub field_type: JavaType,
    #[serde(default = "default_field_modifier")]
    pub modifier: Modifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationMetadata>,
}

impl FieldMetadata {
    /// A private field with no initializer or annotations.
    pub fn new(name: JavaSymbolName, field_type: JavaType) -> Self {
        Self {
            name,
            field_type,
            modifier: Modifier::PRIVATE,
            initializer: None,
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationMetadata) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, annotation_type: &JavaType) -> Option<&AnnotationMetadata> {
        find_annotation(&self.annotations, annotation_type)
    }

    pub fn has_annotation(&self, annotation_type: &JavaType) -> bool {
        self.annotation(annotation_type).is_some()
    }
}

/// A named, typed method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: JavaSymbolName,
    #[serde(rename = "type")]
    pub param_type: JavaType,
}

impl MethodParameter {
    pub fn new(name: JavaSymbolName, param_type: JavaType) -> Self {
        Self {
            name,
            param_type,
        }
    }
}

/// A method declared by a type or introduced by an ITD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub name: JavaSymbolName,
    #[serde(default = "JavaType::void_primitive")]
    pub return_type: JavaType,
    #[serde(default = "default_method_modifier")]
    pub modifier: Modifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<MethodParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationMetadata>,
    /// Body statements without the enclosing braces; `None` for declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl MethodMetadata {
    /// A public method with no parameters, annotations or body.
    pub fn new(name: JavaSymbolName, return_type: JavaType) -> Self {
        Self {
            name,
            return_type,
            modifier: Modifier::PUBLIC,
            parameters: Vec::new(),
            annotations: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, name: JavaSymbolName, param_type: JavaType) -> Self {
        self.parameters.push(MethodParameter::new(name, param_type));
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationMetadata) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn parameter_types(&self) -> Vec<&JavaType> {
        self.parameters.iter().map(|p| &p.param_type).collect()
    }

    /// True if this method has the given name and exact parameter types.
    pub fn matches_signature(&self, name: &JavaSymbolName, parameter_types: &[JavaType]) -> bool {
        &self.name == name
            && self.parameters.len() == parameter_types.len()
            && self.parameters.iter().zip(parameter_types).all(|(p, t)| &p.param_type == t)
    }

    /// `name(type1,type2)`, used for deduplication and log messages.
    pub fn signature(&self) -> String {
        let params: Vec<String> =
            self.parameters.iter().map(|p| p.param_type.to_string()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> JavaSymbolName {
        JavaSymbolName::new(name).unwrap()
    }

    #[test]
    fn test_annotation_display() {
        let annotation = AnnotationMetadata::marker(JavaType::new("javax.validation.constraints.Size"))
            .with_attribute(sym("max"), AnnotationAttributeValue::Integer(30))
            .with_attribute(sym("min"), AnnotationAttributeValue::Integer(2));
        assert_eq!(annotation.to_string(), "@javax.validation.constraints.Size(max = 30, min = 2)");
        assert_eq!(annotation.attribute("max").and_then(AnnotationAttributeValue::as_integer), Some(30));
    }

    #[test]
    fn test_method_signature_matching() {
        let method = MethodMetadata::new(sym("setName"), JavaType::void_primitive())
            .with_parameter(sym("name"), JavaType::string());
        assert!(method.matches_signature(&sym("setName"), &[JavaType::string()]));
        assert!(!method.matches_signature(&sym("setName"), &[]));
        assert_eq!(method.signature(), "setName(java.lang.String)");
    }

    #[test]
    fn test_annotation_deserializes_marker_and_full_forms() {
        #[derive(Deserialize)]
        struct Holder {
            annotations: Vec<AnnotationMetadata>,
        }

        let holder: Holder = toml::from_str(
            r#"
annotations = [
    "javax.persistence.Id",
    { type = "javax.validation.constraints.Size", attributes = { max = 10 } },
]
"#,
        )
        .unwrap();
        assert_eq!(holder.annotations.len(), 2);
        assert!(holder.annotations[0].attributes.is_empty());
        assert_eq!(holder.annotations[1].attribute("max"), Some(&AnnotationAttributeValue::Integer(10)));
    }
}
