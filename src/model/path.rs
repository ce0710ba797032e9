//! Logical source paths and member modifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::MetadataError;

/// A logical location in the project a type lives in (`SRC_MAIN_JAVA`, `SRC_TEST_JAVA`).
///
/// Paths are upper-case tokens so they can never collide with the separators of the
/// metadata identifier format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalPath(String);

impl LogicalPath {
    pub fn new(name: impl Into<String>) -> Result<Self, MetadataError> {
        let name = name.into();
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if valid {
            Ok(Self(name))
        } else {
            Err(MetadataError::InvalidSymbol {
                symbol: format!("{name} (logical paths are upper-case tokens)"),
            })
        }
    }

    pub fn src_main_java() -> Self {
        Self("SRC_MAIN_JAVA".to_string())
    }

    pub fn src_test_java() -> Self {
        Self("SRC_TEST_JAVA".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LogicalPath {
    fn default() -> Self {
        Self::src_main_java()
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LogicalPath {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogicalPath {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogicalPath> for String {
    fn from(value: LogicalPath) -> Self {
        value.0
    }
}

/// Java member modifiers, using the JVM's bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Modifier(u16);

const MODIFIER_NAMES: &[(u16, &str)] = &[
    (Modifier::PUBLIC.0, "public"),
    (Modifier::PRIVATE.0, "private"),
    (Modifier::PROTECTED.0, "protected"),
    (Modifier::STATIC.0, "static"),
    (Modifier::FINAL.0, "final"),
    (Modifier::ABSTRACT.0, "abstract"),
];

impl Modifier {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(0x0001);
    pub const PRIVATE: Self = Self(0x0002);
    pub const PROTECTED: Self = Self(0x0004);
    pub const STATIC: Self = Self(0x0008);
    pub const FINAL: Self = Self(0x0010);
    pub const ABSTRACT: Self = Self(0x0400);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }
}

impl std::ops::BitOr for Modifier {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = (*self).into();
        f.write_str(&names.join(" "))
    }
}

impl TryFrom<Vec<String>> for Modifier {
    type Error = MetadataError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        let mut bits = 0;
        for name in value {
            let Some((bit, _)) = MODIFIER_NAMES.iter().find(|(_, n)| *n == name) else {
                return Err(MetadataError::InvalidSymbol {
                    symbol: format!("{name} (unknown modifier)"),
                });
            };
            bits |= bit;
        }
        Ok(Self(bits))
    }
}

impl From<Modifier> for Vec<String> {
    fn from(value: Modifier) -> Self {
        MODIFIER_NAMES
            .iter()
            .filter(|(bit, _)| value.0 & bit != 0)
            .map(|(_, name)| (*name).to_string())
            .collect()
    }
}
