//! Fully qualified Java type references.
//!
//! A [`JavaType`] is the unit of addressing for everything the engine generates: the
//! target segment of every metadata identifier is one, as are field, parameter and
//! annotation types. Generic parameters are kept in declaration order so that
//! rendered output is stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::symbol::is_java_identifier;
use crate::core::MetadataError;

/// Names of the primitive types, which have no package.
const PRIMITIVES: &[&str] = &["boolean", "byte", "char", "short", "int", "long", "float", "double", "void"];

/// Collection types a generator should treat as "many" relationships.
const COMMON_COLLECTIONS: &[&str] = &[
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Map",
    "java.util.HashSet",
    "java.util.ArrayList",
    "java.util.HashMap",
    "java.util.TreeMap",
    "java.util.Vector",
];

/// A (possibly parameterized) Java type such as `java.util.List<com.example.Customer>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JavaType {
    name: String,
    parameters: Vec<JavaType>,
}

impl JavaType {
    /// Create a type from a fully qualified name without generic parameters.
    ///
    /// The name is not validated; use [`str::parse`] for untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Create a parameterized type, e.g. `java.util.List` of `[Customer]`.
    pub fn with_parameters(name: impl Into<String>, parameters: Vec<JavaType>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn fully_qualified_name(&self) -> &str {
        &self.name
    }

    /// The last dotted segment of the name (`Customer` for `com.example.Customer`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The package portion of the name, empty for the default package and primitives.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    pub fn parameters(&self) -> &[JavaType] {
        &self.parameters
    }

    /// The fully qualified name including rendered generic parameters.
    pub fn name_including_type_parameters(&self) -> String {
        if self.parameters.is_empty() {
            return self.name.clone();
        }
        let params: Vec<String> =
            self.parameters.iter().map(JavaType::name_including_type_parameters).collect();
        format!("{}<{}>", self.name, params.join(", "))
    }

    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.name.as_str())
    }

    pub fn is_common_collection(&self) -> bool {
        COMMON_COLLECTIONS.contains(&self.name.as_str())
    }

    /// A sibling type in the same package with `suffix` appended to the simple name
    /// (`com.example.Customer` -> `com.example.CustomerDataOnDemand`).
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self::new(format!("{}{suffix}", self.name))
    }

    pub fn string() -> Self {
        Self::new("java.lang.String")
    }

    pub fn int_primitive() -> Self {
        Self::new("int")
    }

    pub fn boolean_primitive() -> Self {
        Self::new("boolean")
    }

    pub fn void_primitive() -> Self {
        Self::new("void")
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name_including_type_parameters())
    }
}

impl FromStr for JavaType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ty, rest) = parse_type(s.trim(), s)?;
        if !rest.trim().is_empty() {
            return Err(invalid_type(s, "unexpected trailing characters"));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for JavaType {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JavaType> for String {
    fn from(value: JavaType) -> Self {
        value.name_including_type_parameters()
    }
}

fn invalid_type(input: &str, reason: &str) -> MetadataError {
    MetadataError::InvalidSymbol {
        symbol: format!("{input} ({reason})"),
    }
}

/// Recursive-descent parse of `a.b.C<d.E, F<G>>`, returning the remaining input.
fn parse_type<'a>(input: &'a str, whole: &str) -> Result<(JavaType, &'a str), MetadataError> {
    let end = input.find(['<', '>', ',']).unwrap_or(input.len());
    let name = input[..end].trim();
    if name.is_empty() || !name.split('.').all(is_java_identifier) {
        return Err(invalid_type(whole, "not a qualified Java name"));
    }

    let mut rest = &input[end..];
    let mut parameters = Vec::new();
    if let Some(after) = rest.strip_prefix('<') {
        rest = after;
        loop {
            let (param, after_param) = parse_type(rest.trim_start(), whole)?;
            parameters.push(param);
            let after_param = after_param.trim_start();
            if let Some(next) = after_param.strip_prefix(',') {
                rest = next;
            } else if let Some(next) = after_param.strip_prefix('>') {
                rest = next;
                break;
            } else {
                return Err(invalid_type(whole, "unterminated type parameters"));
            }
        }
    }

    Ok((JavaType::with_parameters(name, parameters), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name_and_package() {
        let ty = JavaType::new("com.example.Customer");
        assert_eq!(ty.simple_name(), "Customer");
        assert_eq!(ty.package(), "com.example");
        assert_eq!(JavaType::int_primitive().package(), "");
        assert!(JavaType::int_primitive().is_primitive());
    }

    #[test]
    fn test_parse_nested_generics() {
        let ty: JavaType =
            "java.util.Map<java.lang.String, java.util.List<com.example.Order>>".parse().unwrap();
        assert_eq!(ty.fully_qualified_name(), "java.util.Map");
        assert_eq!(ty.parameters().len(), 2);
        assert_eq!(ty.parameters()[1].parameters()[0].simple_name(), "Order");
        assert_eq!(
            ty.to_string(),
            "java.util.Map<java.lang.String, java.util.List<com.example.Order>>"
        );
        assert!(ty.is_common_collection());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<JavaType>().is_err());
        assert!("java.util.List<".parse::<JavaType>().is_err());
        assert!("com..Foo".parse::<JavaType>().is_err());
        assert!("Foo> bar".parse::<JavaType>().is_err());
    }

    #[test]
    fn test_with_suffix() {
        let ty = JavaType::new("com.example.Customer");
        assert_eq!(ty.with_suffix("DataOnDemand").simple_name(), "CustomerDataOnDemand");
    }
}
