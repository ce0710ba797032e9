//! Computed metadata artifacts.

use std::sync::Arc;

use super::identifier::MetadataId;
use crate::core::MetadataError;
use crate::itd::ItdTypeDetails;
use crate::model::TypeDetails;

/// What a provider produced for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Nothing beyond validity (invalid items, marker providers).
    Empty,
    /// The parsed member view of a user-owned type.
    PhysicalType(Arc<TypeDetails>),
    /// Members synthesized into an aspect that augments a governor type.
    Itd(Arc<ItdTypeDetails>),
}

/// An immutable computed artifact keyed by its identifier.
///
/// Items are never mutated after construction. A recomputation builds a new item and
/// the cache swaps the `Arc`, so holders of an old item keep a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    id: MetadataId,
    valid: bool,
    invalid_reason: Option<String>,
    payload: Payload,
}

impl MetadataItem {
    /// A valid item carrying `payload`.
    pub fn valid(id: MetadataId, payload: Payload) -> Self {
        Self {
            id,
            valid: true,
            invalid_reason: None,
            payload,
        }
    }

    /// An invalid item. `reason` is kept for diagnostics only.
    pub fn invalid(id: MetadataId, reason: impl Into<String>) -> Self {
        Self {
            id,
            valid: false,
            invalid_reason: Some(reason.into()),
            payload: Payload::Empty,
        }
    }

    /// An invalid item recording why `error` made it unusable.
    pub fn from_error(id: MetadataId, error: &MetadataError) -> Self {
        Self::invalid(id, error.to_string())
    }

    pub fn id(&self) -> &MetadataId {
        &self.id
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalid_reason(&self) -> Option<&str> {
        self.invalid_reason.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The physical type payload, if this is a valid physical type item.
    pub fn type_details(&self) -> Option<&Arc<TypeDetails>> {
        match &self.payload {
            Payload::PhysicalType(details) if self.valid => Some(details),
            _ => None,
        }
    }

    /// The ITD payload, if this is a valid ITD-producing item.
    pub fn itd(&self) -> Option<&Arc<ItdTypeDetails>> {
        match &self.payload {
            Payload::Itd(itd) if self.valid => Some(itd),
            _ => None,
        }
    }
}
