//! Bindings between an editor field and a stored setting.
//!
//! A [`Link`] knows which key it edits, in which store, and reads the scope
//! from a shared [`ScopeCursor`] on every access.  Changing the selected
//! subtree therefore never requires rebuilding links.
//!
//! Two variants exist:
//!
//! - [`DirectLink`] reads and writes the key verbatim.
//! - [`DiffEncodedLink`] displays the merged list computed by the domain and
//!   stores edits as `name+` / `name-` deltas against the pre-edit base.

use std::fmt;
use std::rc::Rc;

use confoverlay_core::{
    compute_delta, join_words, split_words, ScopeCursor, SharedStore, StoreError,
};
use tracing::debug;

use super::indexer::{BaseProvider, ListSettingsDomain};

/// Edits one key verbatim at the cursor's scope.
#[derive(Debug, Clone)]
pub struct DirectLink {
    store: SharedStore,
    key: String,
    cursor: ScopeCursor,
}

impl DirectLink {
    pub fn new(store: SharedStore, key: impl Into<String>, cursor: ScopeCursor) -> Self {
        Self {
            store,
            key: key.into(),
            cursor,
        }
    }

    /// The scope value, else the global value, else `None` (the caller shows
    /// the built-in default).
    pub fn get(&self) -> Option<String> {
        let scope = self.cursor.read();
        let value = self.store.borrow().get(&self.key, &scope).map(str::to_owned);
        debug!(key = %self.key, scope = %scope, found = value.is_some(), "direct link get");
        value
    }

    /// Writes `value` at the current scope, even if it equals the inherited
    /// value.
    ///
    /// # Errors
    ///
    /// Propagates the store's validation and persistence errors.
    pub fn set(&self, value: &str) -> Result<(), StoreError> {
        let scope = self.cursor.read();
        debug!(key = %self.key, scope = %scope, "direct link set");
        self.store.borrow_mut().set(&self.key, value, &scope)
    }
}

/// Edits a list setting through a plus/minus delta.
#[derive(Clone)]
pub struct DiffEncodedLink {
    store: SharedStore,
    name: String,
    cursor: ScopeCursor,
    domain: Rc<dyn ListSettingsDomain>,
    provider: BaseProvider,
}

impl DiffEncodedLink {
    pub fn new(
        store: SharedStore,
        name: impl Into<String>,
        cursor: ScopeCursor,
        domain: Rc<dyn ListSettingsDomain>,
        provider: BaseProvider,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            cursor,
            domain,
            provider,
        }
    }

    /// The merged list at the cursor's scope, joined as list text.
    pub fn get(&self) -> String {
        let scope = self.cursor.read();
        self.domain.select_scope(&scope);
        let merged = (self.provider)();
        debug!(key = %self.name, scope = %scope, entries = merged.len(), "diff link get");
        join_words(&merged)
    }

    /// Stores the edit `text` as the delta against the pre-edit base.
    ///
    /// Both delta keys are written in one store call, so either both or
    /// neither change.  Empty deltas are still written: they shadow any
    /// delta inherited from the global scope.
    ///
    /// # Errors
    ///
    /// Propagates the store's validation and persistence errors.
    pub fn set(&self, text: &str) -> Result<(), StoreError> {
        let scope = self.cursor.read();
        let edited = split_words(text);
        self.domain.select_scope(&scope);
        let base = self.domain.base_list(&self.name);
        let delta = compute_delta(&base, &edited);
        debug!(
            key = %self.name,
            scope = %scope,
            plus = delta.plus.len(),
            minus = delta.minus.len(),
            "diff link set"
        );
        let minus_key = format!("{}-", self.name);
        let plus_key = format!("{}+", self.name);
        self.store.borrow_mut().set_many(
            &[
                (minus_key.as_str(), delta.minus_text()),
                (plus_key.as_str(), delta.plus_text()),
            ],
            &scope,
        )
    }
}

impl fmt::Debug for DiffEncodedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEncodedLink")
            .field("name", &self.name)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

/// A field binding of either kind.
#[derive(Debug, Clone)]
pub enum Link {
    Direct(DirectLink),
    DiffEncoded(DiffEncodedLink),
}

impl Link {
    /// Current value as text, `None` when a direct key is unset everywhere.
    pub fn get(&self) -> Option<String> {
        match self {
            Link::Direct(link) => link.get(),
            Link::DiffEncoded(link) => Some(link.get()),
        }
    }

    /// Stores `text` at the cursor's scope.
    ///
    /// # Errors
    ///
    /// Propagates the store's validation and persistence errors.
    pub fn set(&self, text: &str) -> Result<(), StoreError> {
        match self {
            Link::Direct(link) => link.set(text),
            Link::DiffEncoded(link) => link.set(text),
        }
    }

    /// Returns `true` if the editable layer holds an entry for this field at
    /// exactly the cursor's scope.
    pub fn is_set_here(&self) -> bool {
        match self {
            Link::Direct(link) => {
                let scope = link.cursor.read();
                link.store.borrow().get_local(&link.key, &scope).is_some()
            }
            Link::DiffEncoded(link) => {
                let scope = link.cursor.read();
                let store = link.store.borrow();
                store.get_local(&format!("{}+", link.name), &scope).is_some()
                    || store.get_local(&format!("{}-", link.name), &scope).is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::{IndexerSettings, SKIPPED_NAMES};
    use confoverlay_core::{shared, ConfigStore};

    fn diff_link(
        store: &SharedStore,
        cursor: &ScopeCursor,
    ) -> (Rc<IndexerSettings>, DiffEncodedLink) {
        let domain = Rc::new(IndexerSettings::new(store.clone()));
        let provider = domain.provider(SKIPPED_NAMES).expect("list field");
        let link = DiffEncodedLink::new(
            store.clone(),
            SKIPPED_NAMES,
            cursor.clone(),
            domain.clone(),
            provider,
        );
        (domain, link)
    }

    // ── Direct ────────────────────────────────────────────────────────────────

    #[test]
    fn test_direct_get_falls_back_to_global_then_none() {
        // Arrange
        let store = shared(ConfigStore::in_memory());
        let cursor = ScopeCursor::new();
        let link = DirectLink::new(store.clone(), "defaultcharset", cursor.clone());
        cursor.write("sub1");

        // Act / Assert
        assert_eq!(link.get(), None);
        store.borrow_mut().set("defaultcharset", "X", "").unwrap();
        assert_eq!(link.get().as_deref(), Some("X"));
    }

    #[test]
    fn test_direct_set_equal_to_inherited_is_still_stored() {
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set("defaultcharset", "X", "").unwrap();
        let cursor = ScopeCursor::new();
        cursor.write("sub1");
        let link = Link::Direct(DirectLink::new(store.clone(), "defaultcharset", cursor));
        assert!(!link.is_set_here());

        link.set("X").unwrap();

        assert_eq!(store.borrow().get_local("defaultcharset", "sub1"), Some("X"));
        assert!(link.is_set_here());
    }

    #[test]
    fn test_cursor_write_retargets_existing_link() {
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set("followLinks", "1", "/a").unwrap();
        store.borrow_mut().set("followLinks", "0", "/b").unwrap();
        let cursor = ScopeCursor::new();
        let link = DirectLink::new(store, "followLinks", cursor.clone());

        cursor.write("/a");
        assert_eq!(link.get().as_deref(), Some("1"));
        cursor.write("/b");
        assert_eq!(link.get().as_deref(), Some("0"));
    }

    // ── Diff-encoded ──────────────────────────────────────────────────────────

    #[test]
    fn test_diff_set_stores_delta_against_base() {
        // Arrange
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set(SKIPPED_NAMES, "a b c", "").unwrap();
        let cursor = ScopeCursor::new();
        cursor.write("/src");
        let (_domain, link) = diff_link(&store, &cursor);

        // Act
        link.set("b d").unwrap();

        // Assert
        let s = store.borrow();
        assert_eq!(s.get_local("skippedNames+", "/src"), Some("d"));
        assert_eq!(s.get_local("skippedNames-", "/src"), Some("a c"));
        assert_eq!(s.get_local(SKIPPED_NAMES, "/src"), None, "bare key untouched");
    }

    #[test]
    fn test_diff_get_after_set_returns_edited_set() {
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set(SKIPPED_NAMES, "a b c", "").unwrap();
        let cursor = ScopeCursor::new();
        cursor.write("/src");
        let (_domain, link) = diff_link(&store, &cursor);

        link.set("b d").unwrap();

        assert_eq!(link.get(), "b d");
    }

    #[test]
    fn test_diff_second_edit_is_relative_to_base_not_previous_edit() {
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set(SKIPPED_NAMES, "a b c", "").unwrap();
        let cursor = ScopeCursor::new();
        cursor.write("/src");
        let (_domain, link) = diff_link(&store, &cursor);

        link.set("b d").unwrap();
        link.set("a b c d").unwrap();

        let s = store.borrow();
        assert_eq!(s.get_local("skippedNames+", "/src"), Some("d"));
        assert_eq!(s.get_local("skippedNames-", "/src"), Some(""));
    }

    #[test]
    fn test_diff_get_survives_base_drift() {
        // Arrange
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set(SKIPPED_NAMES, "a b c", "").unwrap();
        let cursor = ScopeCursor::new();
        cursor.write("/src");
        let (_domain, link) = diff_link(&store, &cursor);
        link.set("b d").unwrap();

        // Act: the base changes after the edit
        store.borrow_mut().set(SKIPPED_NAMES, "b c e", "").unwrap();

        // Assert
        let mut merged = split_words(&link.get());
        merged.sort();
        assert_eq!(merged, vec!["b", "d", "e"]);
    }

    #[test]
    fn test_diff_set_is_atomic_on_persistence_failure() {
        use confoverlay_core::MemoryBackend;
        use std::sync::Arc;

        let backend = Arc::new(MemoryBackend::new());
        let store = shared(ConfigStore::open(backend.clone()).unwrap());
        let cursor = ScopeCursor::new();
        let (_domain, link) = diff_link(&store, &cursor);
        backend.set_fail_writes(true);

        assert!(link.set("only-this").is_err());

        let s = store.borrow();
        assert_eq!(s.get_local("skippedNames+", ""), None);
        assert_eq!(s.get_local("skippedNames-", ""), None);
    }

    #[test]
    fn test_diff_words_with_spaces_survive() {
        let store = shared(ConfigStore::in_memory());
        store.borrow_mut().set(SKIPPED_NAMES, "a", "").unwrap();
        let cursor = ScopeCursor::new();
        let (_domain, link) = diff_link(&store, &cursor);

        link.set("a \"My Stuff\"").unwrap();

        assert_eq!(split_words(&link.get()), vec!["a", "My Stuff"]);
    }
}
