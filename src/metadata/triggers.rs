//! Declarative mapping from marker annotations to provider tags.

use std::collections::{BTreeMap, BTreeSet};

use super::identifier::ProviderTag;
use crate::model::JavaType;

/// Provider tag -> the marker annotation types it reacts to.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    entries: BTreeMap<ProviderTag, BTreeSet<String>>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the triggers of `tag`. An empty list removes the entry.
    pub fn register(&mut self, tag: &ProviderTag, triggers: &[JavaType]) {
        if triggers.is_empty() {
            self.entries.remove(tag);
            return;
        }
        let names = triggers.iter().map(|t| t.fully_qualified_name().to_string()).collect();
        self.entries.insert(tag.clone(), names);
    }

    pub fn remove(&mut self, tag: &ProviderTag) -> bool {
        self.entries.remove(tag).is_some()
    }

    /// Tags with at least one trigger among `annotations`, in tag order.
    pub fn matching_tags<'t>(
        &self,
        annotations: impl IntoIterator<Item = &'t JavaType> + Clone,
    ) -> Vec<&ProviderTag> {
        self.entries
            .iter()
            .filter(|(_, names)| {
                annotations.clone().into_iter().any(|a| names.contains(a.fully_qualified_name()))
            })
            .map(|(tag, _)| tag)
            .collect()
    }

    /// Triggers registered for `tag`.
    pub fn triggers_of(&self, tag: &ProviderTag) -> Vec<&str> {
        self.entries
            .get(tag)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
