//! In-memory form of one configuration layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::scope::GLOBAL_SCOPE;

/// Keys and values of one section.
pub type Section = BTreeMap<String, String>;

/// Ordered mapping `scope → key → value` for one configuration layer.
///
/// The global section (`""`) always exists conceptually; other sections
/// exist once created, even when empty, so a freshly added subtree can be
/// listed before any of its settings are customised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    sections: BTreeMap<String, Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, scope: &str, key: &str) -> Option<&str> {
        self.sections
            .get(scope)
            .and_then(|section| section.get(key))
            .map(String::as_str)
    }

    pub fn set(&mut self, scope: &str, key: &str, value: &str) {
        self.sections
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Removes a single key.  Returns the previous value.
    pub fn remove(&mut self, scope: &str, key: &str) -> Option<String> {
        self.sections.get_mut(scope)?.remove(key)
    }

    /// Registers an empty section if it does not exist yet.
    pub fn ensure_section(&mut self, scope: &str) {
        self.sections.entry(scope.to_string()).or_default();
    }

    /// Removes a section and all of its keys.  Returns `true` if it existed.
    pub fn remove_section(&mut self, scope: &str) -> bool {
        self.sections.remove(scope).is_some()
    }

    pub fn has_section(&self, scope: &str) -> bool {
        scope == GLOBAL_SCOPE || self.sections.contains_key(scope)
    }

    pub fn section(&self, scope: &str) -> Option<&Section> {
        self.sections.get(scope)
    }

    /// Names of the non-global sections, in order.
    pub fn subsection_names(&self) -> impl Iterator<Item = &str> {
        self.sections
            .keys()
            .map(String::as_str)
            .filter(|name| *name != GLOBAL_SCOPE)
    }

    /// Keys defined directly in `scope`, in order.
    pub fn keys(&self, scope: &str) -> impl Iterator<Item = &str> {
        self.sections
            .get(scope)
            .into_iter()
            .flat_map(|section| section.keys().map(String::as_str))
    }

    /// All sections including the global one, global first.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    /// Returns `true` when no section holds any key and no subtree is registered.
    pub fn is_empty(&self) -> bool {
        self.sections
            .iter()
            .all(|(name, section)| name == GLOBAL_SCOPE && section.is_empty())
    }
}
