//! Metadata identification strings.
//!
//! Every node of the metadata graph is addressed by a [`MetadataId`]. Two shapes exist:
//!
//! ```text
//! MID:<providerTag>                          class-level: the provider kind as a whole
//! MID:<providerTag>#<LOGICAL_PATH>?<type>    instance-level: one (tag, type, path) triple
//! ```
//!
//! For example `MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer`. The canonical string
//! is what users see in logs and on the command line; internally the parsed parts are
//! kept so equality, hashing and ordering are structural.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::MetadataError;
use crate::model::{JavaType, LogicalPath};

/// Prefix shared by every metadata identifier.
pub const MID_PREFIX: &str = "MID:";

const INSTANCE_SEPARATOR: char = '#';
const PATH_SEPARATOR: char = '?';

/// The tag naming one kind of metadata (and the provider that computes it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderTag(String);

impl ProviderTag {
    /// Validate and wrap a provider tag.
    ///
    /// Tags may not be empty and may not contain whitespace or any of the identifier
    /// separators (`#`, `?`, `:`).
    pub fn new(tag: impl Into<String>) -> Result<Self, MetadataError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(MetadataError::malformed(tag, "provider tag is empty"));
        }
        if let Some(c) = tag.chars().find(|c| c.is_whitespace() || matches!(c, '#' | '?' | ':')) {
            return Err(MetadataError::malformed(
                tag.clone(),
                format!("provider tag contains reserved character '{c}'"),
            ));
        }
        Ok(Self(tag))
    }

    /// Wrap a tag known at compile time to be valid.
    pub(crate) fn from_static(tag: &'static str) -> Self {
        debug_assert!(Self::new(tag).is_ok(), "invalid provider tag {tag}");
        Self(tag.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderTag {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProviderTag {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderTag> for String {
    fn from(value: ProviderTag) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct InstanceKey {
    path: LogicalPath,
    target: JavaType,
}

/// A parsed metadata identifier.
///
/// Construction is pure and deterministic: the same triple always yields an equal
/// identifier and the same canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataId {
    tag: ProviderTag,
    instance: Option<InstanceKey>,
}

impl MetadataId {
    /// Create the instance identifier for `(tag, target, path)`.
    pub fn create(tag: &ProviderTag, target: &JavaType, path: &LogicalPath) -> Self {
        Self {
            tag: tag.clone(),
            instance: Some(InstanceKey {
                path: path.clone(),
                target: target.clone(),
            }),
        }
    }

    /// Create the class-level identifier for a provider tag.
    pub fn class_level(tag: &ProviderTag) -> Self {
        Self {
            tag: tag.clone(),
            instance: None,
        }
    }

    /// Parse an identifier string.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MalformedIdentifier`] if the `MID:` prefix is missing, the tag is
    /// invalid, or the instance part does not split into exactly a path and a type.
    pub fn parse(s: &str) -> Result<Self, MetadataError> {
        let Some(body) = s.strip_prefix(MID_PREFIX) else {
            return Err(MetadataError::malformed(s, format!("missing '{MID_PREFIX}' prefix")));
        };

        let Some((tag, instance)) = body.split_once(INSTANCE_SEPARATOR) else {
            let tag = ProviderTag::new(body).map_err(|e| rewrap(s, e))?;
            return Ok(Self::class_level(&tag));
        };

        let tag = ProviderTag::new(tag).map_err(|e| rewrap(s, e))?;
        let segments: Vec<&str> = instance.split(PATH_SEPARATOR).collect();
        let [path, target] = segments.as_slice() else {
            return Err(MetadataError::malformed(
                s,
                format!("expected '<PATH>{PATH_SEPARATOR}<type>' after '{INSTANCE_SEPARATOR}'"),
            ));
        };
        let path = LogicalPath::new(*path).map_err(|e| rewrap(s, e))?;
        let target: JavaType = target.parse().map_err(|e| rewrap(s, e))?;

        Ok(Self::create(&tag, &target, &path))
    }

    /// True if `s` is a well-formed instance identifier for `tag`.
    pub fn is_valid(tag: &ProviderTag, s: &str) -> bool {
        Self::parse(s).is_ok_and(|id| &id.tag == tag && !id.is_class_level())
    }

    /// Parse `s`, requiring an instance identifier of the given tag.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MalformedIdentifier`] if `s` does not parse, is class-level, or
    /// carries a different provider tag.
    pub fn parse_for(tag: &ProviderTag, s: &str) -> Result<Self, MetadataError> {
        let id = Self::parse(s)?;
        if &id.tag != tag {
            return Err(MetadataError::malformed(
                s,
                format!("expected provider tag '{tag}', found '{}'", id.tag),
            ));
        }
        if id.is_class_level() {
            return Err(MetadataError::malformed(s, "expected an instance identifier"));
        }
        Ok(id)
    }

    /// The target type encoded in `s`, which must be an identifier of `tag`.
    pub fn target_type_of(tag: &ProviderTag, s: &str) -> Result<JavaType, MetadataError> {
        let id = Self::parse_for(tag, s)?;
        id.target_type().cloned().ok_or_else(|| MetadataError::malformed(s, "no target type"))
    }

    /// The logical path encoded in `s`, which must be an identifier of `tag`.
    pub fn path_of(tag: &ProviderTag, s: &str) -> Result<LogicalPath, MetadataError> {
        let id = Self::parse_for(tag, s)?;
        id.path().cloned().ok_or_else(|| MetadataError::malformed(s, "no logical path"))
    }

    pub fn provider_tag(&self) -> &ProviderTag {
        &self.tag
    }

    /// The target type, `None` for class-level identifiers.
    pub fn target_type(&self) -> Option<&JavaType> {
        self.instance.as_ref().map(|i| &i.target)
    }

    /// The logical path, `None` for class-level identifiers.
    pub fn path(&self) -> Option<&LogicalPath> {
        self.instance.as_ref().map(|i| &i.path)
    }

    pub fn is_class_level(&self) -> bool {
        self.instance.is_none()
    }

    /// The class-level identifier of this identifier's provider tag.
    pub fn class_id(&self) -> Self {
        Self::class_level(&self.tag)
    }

    /// The identifier of the same target and path under a different provider tag.
    ///
    /// Returns `None` for class-level identifiers, which have no target.
    pub fn with_tag(&self, tag: &ProviderTag) -> Option<Self> {
        self.instance.as_ref().map(|i| Self::create(tag, &i.target, &i.path))
    }
}

fn rewrap(id: &str, error: MetadataError) -> MetadataError {
    match error {
        MetadataError::MalformedIdentifier {
            reason,
            ..
        } => MetadataError::malformed(id, reason),
        other => MetadataError::malformed(id, other.to_string()),
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MID_PREFIX}{}", self.tag)?;
        if let Some(instance) = &self.instance {
            write!(f, "{INSTANCE_SEPARATOR}{}{PATH_SEPARATOR}{}", instance.path, instance.target)?;
        }
        Ok(())
    }
}

impl FromStr for MetadataId {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MetadataId {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MetadataId> for String {
    fn from(value: MetadataId) -> Self {
        value.to_string()
    }
}
