//! Validated Java identifiers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::core::MetadataError;

/// Matches a single Java identifier segment (no dots).
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex"));

/// Returns true if `candidate` is a legal Java identifier segment.
pub fn is_java_identifier(candidate: &str) -> bool {
    IDENTIFIER_RE.is_match(candidate)
}

/// A field, method, parameter or annotation-attribute name.
///
/// Construction validates the name, so every `JavaSymbolName` in the metamodel is
/// guaranteed to be a legal identifier when it reaches a generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JavaSymbolName(String);

impl JavaSymbolName {
    /// Create a symbol name, rejecting anything that is not a Java identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, MetadataError> {
        let name = name.into();
        if is_java_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(MetadataError::InvalidSymbol {
                symbol: name,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `name` -> `Name`, used to derive accessor names from properties.
    #[must_use]
    pub fn capitalized(&self) -> String {
        capitalize(&self.0)
    }

    /// Prefix the symbol with `prefix` and capitalize the original (`get` + `name`).
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self(format!("{prefix}{}", self.capitalized()))
    }
}

/// Uppercase the first character of `value`.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character of `value`.
pub fn uncapitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for JavaSymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JavaSymbolName {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JavaSymbolName {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JavaSymbolName> for String {
    fn from(value: JavaSymbolName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_symbols() {
        assert!(JavaSymbolName::new("name").is_ok());
        assert!(JavaSymbolName::new("_rnd").is_ok());
        assert!(JavaSymbolName::new("$value1").is_ok());
    }

    #[test]
    fn test_invalid_symbols() {
        assert!(JavaSymbolName::new("").is_err());
        assert!(JavaSymbolName::new("1abc").is_err());
        assert!(JavaSymbolName::new("a.b").is_err());
        assert!(JavaSymbolName::new("has space").is_err());
    }

    #[test]
    fn test_prefixed_and_case_helpers() {
        let name = JavaSymbolName::new("firstName").unwrap();
        assert_eq!(name.prefixed("get").as_str(), "getFirstName");
        assert_eq!(uncapitalize("CustomerDataOnDemand"), "customerDataOnDemand");
        assert_eq!(capitalize(""), "");
    }
}
